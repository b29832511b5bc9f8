pub mod binary_node;
pub mod cube;

pub use cube::{Axis, Edge, Face, Octant, CORNERS, EDGES, FACES};
