//! An octree whose internal nodes always have all 8 children, with same-depth face, edge and
//! corner neighbor queries and tree-wide keys for the corners of its cells.

pub mod config;
pub mod corner;
pub mod index;
pub mod neighbor;
pub mod traversal;
pub mod tree;

pub use config::TreeConfig;
pub use corner::{corner_key, corner_key_components, unpack_corner_key, MAX_CORNER_DEPTH};
pub use index::NodeIndex;
pub use tree::{NodeHandle, Octree};

pub use isotree_util::{Axis, Edge, Face, Octant};

#[cfg(test)]
mod tests;
