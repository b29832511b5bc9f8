//! Combinatorial conventions for the corners, faces and edges of a cube.
//!
//! A corner (or octant) code packs one bit per axis: `x | y << 1 | z << 2`. A face code is
//! `axis * 2 + side`. An edge code is `axis << 2 | j << 1 | i`, where `axis` is the axis the edge
//! runs along and `i`, `j` are the side bits on the two remaining axes, in ascending axis order.

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

pub const CORNERS: usize = 8;
pub const FACES: usize = 6;
pub const EDGES: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Refers to one octant of a cube that has been split into 8 along 3 orthogonal planes. The same
/// code identifies the corner of the cube lying in that octant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Octant(u8);

/// One of the 6 faces of a cube.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Face(u8);

/// One of the 12 edges of a cube.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Edge(u8);

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    #[inline]
    pub fn from_index(index: usize) -> Axis {
        match index {
            0 => Axis::X,
            1 => Axis::Y,
            2 => Axis::Z,
            _ => panic!("Axis has invalid index {}", index),
        }
    }

    /// The two axes orthogonal to this one, in ascending order.
    #[inline]
    pub fn others(self) -> [Axis; 2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::X, Axis::Z],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }
}

impl Octant {
    #[inline]
    pub fn as_index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Octant {
        assert!(index < CORNERS, "Octant has invalid index {}", index);
        Octant(index as u8)
    }

    #[inline]
    pub fn from_bits(x: usize, y: usize, z: usize) -> Octant {
        Octant::from_index((x & 1) | (y & 1) << 1 | (z & 1) << 2)
    }

    /// Splits the code into its per-axis bits.
    #[inline]
    pub fn factor(self) -> [usize; 3] {
        let index = self.as_index();
        [index & 1, (index >> 1) & 1, (index >> 2) & 1]
    }

    #[inline]
    pub fn bit(self, axis: Axis) -> usize {
        (self.as_index() >> axis.index()) & 1
    }

    #[inline]
    pub fn flip(self, axis: Axis) -> Octant {
        Octant(self.0 ^ (1 << axis.index()))
    }

    /// The octant diagonally across the cube's center.
    #[inline]
    pub fn opposite(self) -> Octant {
        Octant(!self.0 & 7)
    }

    #[inline]
    pub fn next(self) -> Option<Octant> {
        let index = self.as_index();
        if 1 + index < CORNERS {
            Some(Octant::from_index(1 + index))
        } else {
            None
        }
    }

    #[inline]
    pub fn as_direction(self) -> Vector3<i64> {
        let [x, y, z] = self.factor();
        Vector3::new(x as i64 * 2 - 1, y as i64 * 2 - 1, z as i64 * 2 - 1)
    }

    #[inline]
    pub fn enumerate() -> [Self; 8] {
        let mut octants = [Self::from_index(0); 8];
        for (i, octant) in octants.iter_mut().enumerate() {
            *octant = Self::from_index(i);
        }
        octants
    }
}

impl Face {
    #[inline]
    pub fn as_index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Face {
        assert!(index < FACES, "Face has invalid index {}", index);
        Face(index as u8)
    }

    #[inline]
    pub fn new(axis: Axis, side: usize) -> Face {
        Face::from_index(axis.index() * 2 + (side & 1))
    }

    #[inline]
    pub fn axis(self) -> Axis {
        Axis::from_index(self.as_index() >> 1)
    }

    #[inline]
    pub fn side(self) -> usize {
        self.as_index() & 1
    }

    #[inline]
    pub fn opposite(self) -> Face {
        Face(self.0 ^ 1)
    }

    pub fn enumerate() -> impl Iterator<Item = Face> {
        (0..FACES).map(Face::from_index)
    }
}

impl Edge {
    #[inline]
    pub fn as_index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Edge {
        assert!(index < EDGES, "Edge has invalid index {}", index);
        Edge(index as u8)
    }

    /// Builds the edge running along `axis`, lying on side `i` of the first remaining axis and
    /// side `j` of the second.
    #[inline]
    pub fn new(axis: Axis, i: usize, j: usize) -> Edge {
        Edge::from_index(axis.index() << 2 | (j & 1) << 1 | (i & 1))
    }

    #[inline]
    pub fn axis(self) -> Axis {
        Axis::from_index(self.as_index() >> 2)
    }

    /// Returns the axis the edge runs along and its side bits on `axis.others()`.
    #[inline]
    pub fn factor(self) -> (Axis, [usize; 2]) {
        let index = self.as_index();
        (self.axis(), [index & 1, (index >> 1) & 1])
    }

    pub fn enumerate() -> impl Iterator<Item = Edge> {
        (0..EDGES).map(Edge::from_index)
    }
}
