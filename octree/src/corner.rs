//! Keys identifying the corners of the dense grid at a chosen depth, independently of the node
//! used to reach them.

use isotree_util::{binary_node, Axis, Octant};

use crate::index::NodeIndex;
use crate::tree::{NodeHandle, Octree};

/// Bits per axis in a packed corner key.
pub const CORNER_KEY_BITS: u32 = 21;

/// Deepest grid whose corners fit in a key. Along each axis a grid of depth `d` has corners
/// `0..=2^(d+1)` on the doubled grid the keys are expressed in.
pub const MAX_CORNER_DEPTH: u32 = CORNER_KEY_BITS - 2;

const AXIS_MASK: u64 = (1 << CORNER_KEY_BITS) - 1;

/// Packs the position of `corner` of the node at `index` into a single key. Two node/corner
/// pairs give the same key exactly when they name the same point of the grid at `max_depth`.
#[inline]
pub fn corner_key(index: NodeIndex, corner: Octant, max_depth: u32) -> u64 {
    corner_key_components(index, corner, max_depth).0
}

/// Like `corner_key`, also returning the per-axis components of the key.
pub fn corner_key_components(index: NodeIndex, corner: Octant, max_depth: u32) -> (u64, [u32; 3]) {
    assert!(
        max_depth <= MAX_CORNER_DEPTH,
        "corner keys support depths up to {}, got {}",
        MAX_CORNER_DEPTH,
        max_depth
    );
    assert!(
        index.depth <= max_depth + 1,
        "node at depth {} is below the corner grid at depth {}",
        index.depth,
        max_depth
    );

    let mut components = [0u32; 3];
    let mut key = 0;
    for &axis in Axis::ALL.iter() {
        let i = axis.index();
        let component = binary_node::corner_index(
            max_depth + 1,
            index.depth,
            index.offset[i],
            corner.bit(axis),
        );
        components[i] = component as u32;
        key |= component << (CORNER_KEY_BITS * i as u32);
    }

    (key, components)
}

/// Splits a key produced by `corner_key` back into its per-axis components.
#[inline]
pub fn unpack_corner_key(key: u64) -> [u32; 3] {
    [
        (key & AXIS_MASK) as u32,
        ((key >> CORNER_KEY_BITS) & AXIS_MASK) as u32,
        ((key >> (2 * CORNER_KEY_BITS)) & AXIS_MASK) as u32,
    ]
}

impl<T> Octree<T> {
    /// `corner_key` for a node of this tree, deriving its index from its position.
    pub fn corner_key(&self, node: NodeHandle, corner: Octant, max_depth: u32) -> u64 {
        corner_key(self.index_of(node), corner, max_depth)
    }
}
