use std::ops::AddAssign;

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use isotree_util::{Axis, Octant};

/// Position of a node within the implicit dense grid at its depth. The root is at depth 0,
/// offset (0, 0, 0) and spans the unit cube.
///
/// The index is never stored in the tree. Callers carry it alongside a node handle and must keep
/// the two in step: descending into child `c` corresponds to `index.child(c)`, and moving to the
/// parent corresponds to `index.parent()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeIndex {
    pub depth: u32,
    pub offset: [u32; 3],
}

impl NodeIndex {
    pub const MAX_DEPTH: u32 = 31;

    #[inline]
    pub fn root() -> NodeIndex {
        NodeIndex::default()
    }

    /// The index one level deeper, within the given octant of this node.
    #[inline]
    pub fn child(self, octant: Octant) -> NodeIndex {
        assert!(self.depth < Self::MAX_DEPTH, "node index too deep to descend");
        let bits = octant.factor();
        NodeIndex {
            depth: self.depth + 1,
            offset: [
                (self.offset[0] << 1) | bits[0] as u32,
                (self.offset[1] << 1) | bits[1] as u32,
                (self.offset[2] << 1) | bits[2] as u32,
            ],
        }
    }

    /// The index one level shallower. The parent of the root is the root.
    #[inline]
    pub fn parent(self) -> NodeIndex {
        NodeIndex {
            depth: self.depth.saturating_sub(1),
            offset: [self.offset[0] >> 1, self.offset[1] >> 1, self.offset[2] >> 1],
        }
    }

    /// In-place equivalent of `parent`.
    #[inline]
    pub fn ascend(&mut self) {
        *self = self.parent();
    }

    /// The octant this index occupies within its parent. Meaningless at depth 0.
    #[inline]
    pub fn octant(self) -> Octant {
        Octant::from_bits(
            self.offset[0] as usize,
            self.offset[1] as usize,
            self.offset[2] as usize,
        )
    }

    /// True if every offset component lies inside the grid at this depth.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.depth <= Self::MAX_DEPTH && self.offset.iter().all(|&o| (o as u64) < 1u64 << self.depth)
    }

    #[inline]
    pub fn width(self) -> f64 {
        1.0 / (1u64 << self.depth) as f64
    }

    /// Center and side length of the cube covered by this index, within the unit cube.
    pub fn center_and_width(self) -> (Point3<f64>, f64) {
        let width = self.width();
        let center = |axis: usize| (self.offset[axis] as f64 + 0.5) * width;
        (Point3::new(center(0), center(1), center(2)), width)
    }

    /// Position of one of the cube's corners, within the unit cube.
    pub fn corner_position(self, corner: Octant) -> Point3<f64> {
        let width = self.width();
        let coord = |axis: Axis| {
            (self.offset[axis.index()] as f64 + corner.bit(axis) as f64) * width
        };
        Point3::new(coord(Axis::X), coord(Axis::Y), coord(Axis::Z))
    }
}

impl AddAssign<Octant> for NodeIndex {
    #[inline]
    fn add_assign(&mut self, octant: Octant) {
        *self = self.child(octant);
    }
}
