//! Addressing along a single axis of a binary tree of intervals.
//!
//! A tree with `levels` levels below its root splits the unit interval into `2^levels` cells,
//! delimited by `2^levels + 1` corners. A node at `depth` with integer `offset` spans the
//! interval `[offset, offset + 1] / 2^depth`.

/// Number of distinct corners along one axis of a tree with `levels` levels.
#[inline]
pub fn corner_count(levels: u32) -> u64 {
    (1u64 << levels) + 1
}

/// Index of the lower (`side == 0`) or upper (`side == 1`) end of the interval of the node at
/// `depth` and `offset`, expressed on the finest grid of a tree with `levels` levels. The result
/// is in `[0, 2^levels]` and depends only on the geometric position of the end point.
#[inline]
pub fn corner_index(levels: u32, depth: u32, offset: u32, side: usize) -> u64 {
    debug_assert!(depth <= levels, "depth {} exceeds {} levels", depth, levels);
    (offset as u64 + (side & 1) as u64) << (levels - depth)
}
