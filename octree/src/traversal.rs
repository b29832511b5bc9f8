//! Stackless traversal. Siblings sit in a contiguous block in octant order, so the successor of a
//! node is found by moving to the next slot of its block, climbing to the parent whenever the
//! last slot has been passed.
//!
//! Every method takes the node `from` which the traversal is rooted at, and the node returned by
//! the previous step (`None` to start). No cursor is kept inside the tree, so a traversal may be
//! resumed from any node it has yielded.

use isotree_util::Octant;

use crate::index::NodeIndex;
use crate::tree::{NodeHandle, Octree};

type Step<T> = fn(&Octree<T>, NodeHandle, Option<NodeHandle>) -> Option<NodeHandle>;

type IndexedStep<T> = fn(
    &Octree<T>,
    NodeHandle,
    NodeIndex,
    Option<(NodeHandle, NodeIndex)>,
) -> Option<(NodeHandle, NodeIndex)>;

/// Iterates over the handles produced by repeatedly applying one of the traversal steps.
pub struct Iter<'a, T> {
    tree: &'a Octree<T>,
    from: NodeHandle,
    step: Step<T>,
    last: Option<NodeHandle>,
    finished: bool,
}

/// Like `Iter`, but also yields the index of each node.
pub struct IndexedIter<'a, T> {
    tree: &'a Octree<T>,
    from: NodeHandle,
    from_index: NodeIndex,
    step: IndexedStep<T>,
    last: Option<(NodeHandle, NodeIndex)>,
    finished: bool,
}

impl<T> Octree<T> {
    /// The first node after the subtree of `current` in pre-order, at the same depth as
    /// `current` or shallower. Returns `None` once the subtree of `from` is exhausted.
    pub fn next_branch(&self, from: NodeHandle, current: NodeHandle) -> Option<NodeHandle> {
        if current == from {
            return None;
        }

        let (parent, octant) = self.slot(current)?;
        match octant.next() {
            None => self.next_branch(from, parent),
            Some(next) => Some(self.sibling(current, next)),
        }
    }

    /// Leaves of the subtree at `from`, left to right.
    pub fn next_leaf(&self, from: NodeHandle, current: Option<NodeHandle>) -> Option<NodeHandle> {
        let current = match current {
            None => return Some(self.leftmost_leaf(from)),
            Some(current) => current,
        };

        if !self.is_leaf(current) {
            return Some(self.leftmost_leaf(current));
        }

        self.next_branch(from, current)
            .map(|branch| self.leftmost_leaf(branch))
    }

    /// All nodes of the subtree at `from` in pre-order: parents before children, siblings in
    /// octant order.
    pub fn next_node(&self, from: NodeHandle, current: Option<NodeHandle>) -> Option<NodeHandle> {
        match current {
            None => Some(from),
            Some(current) => match self.first_child(current) {
                Some(first) => Some(first),
                None => self.next_branch(from, current),
            },
        }
    }

    /// `next_branch`, carrying the index of `current` along and returning the index of the
    /// result.
    pub fn next_branch_indexed(
        &self,
        from: NodeHandle,
        current: NodeHandle,
        index: NodeIndex,
    ) -> Option<(NodeHandle, NodeIndex)> {
        if current == from {
            return None;
        }

        let (parent, octant) = self.slot(current)?;
        match octant.next() {
            None => self.next_branch_indexed(from, parent, index.parent()),
            Some(next) => Some((self.sibling(current, next), index.parent().child(next))),
        }
    }

    /// `next_leaf`, tracking indices. `from_index` is the index of `from`.
    pub fn next_leaf_indexed(
        &self,
        from: NodeHandle,
        from_index: NodeIndex,
        current: Option<(NodeHandle, NodeIndex)>,
    ) -> Option<(NodeHandle, NodeIndex)> {
        let (current, index) = match current {
            None => return Some(self.leftmost_leaf_indexed(from, from_index)),
            Some(current) => current,
        };

        if !self.is_leaf(current) {
            return Some(self.leftmost_leaf_indexed(current, index));
        }

        self.next_branch_indexed(from, current, index)
            .map(|(branch, index)| self.leftmost_leaf_indexed(branch, index))
    }

    /// `next_node`, tracking indices. `from_index` is the index of `from`.
    pub fn next_node_indexed(
        &self,
        from: NodeHandle,
        from_index: NodeIndex,
        current: Option<(NodeHandle, NodeIndex)>,
    ) -> Option<(NodeHandle, NodeIndex)> {
        match current {
            None => Some((from, from_index)),
            Some((current, index)) => match self.first_child(current) {
                Some(first) => Some((first, index.child(Octant::from_index(0)))),
                None => self.next_branch_indexed(from, current, index),
            },
        }
    }

    pub fn iter_nodes(&self, from: NodeHandle) -> Iter<T> {
        Iter::new(self, from, Self::next_node)
    }

    pub fn iter_leaves(&self, from: NodeHandle) -> Iter<T> {
        Iter::new(self, from, Self::next_leaf)
    }

    /// Pre-order walk of the subtree at `from`, whose index is `from_index`.
    pub fn iter_nodes_indexed(&self, from: NodeHandle, from_index: NodeIndex) -> IndexedIter<T> {
        IndexedIter::new(self, from, from_index, Self::next_node_indexed)
    }

    pub fn iter_leaves_indexed(&self, from: NodeHandle, from_index: NodeIndex) -> IndexedIter<T> {
        IndexedIter::new(self, from, from_index, Self::next_leaf_indexed)
    }

    fn leftmost_leaf(&self, from: NodeHandle) -> NodeHandle {
        let mut node = from;
        while let Some(first) = self.first_child(node) {
            node = first;
        }
        node
    }

    fn leftmost_leaf_indexed(&self, from: NodeHandle, index: NodeIndex) -> (NodeHandle, NodeIndex) {
        let mut node = from;
        let mut index = index;
        while let Some(first) = self.first_child(node) {
            node = first;
            index += Octant::from_index(0);
        }
        (node, index)
    }
}

impl<'a, T> Iter<'a, T> {
    fn new(tree: &'a Octree<T>, from: NodeHandle, step: Step<T>) -> Self {
        Iter {
            tree,
            from,
            step,
            last: None,
            finished: false,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = NodeHandle;

    fn next(&mut self) -> Option<NodeHandle> {
        if self.finished {
            return None;
        }

        let next = (self.step)(self.tree, self.from, self.last);
        self.finished = next.is_none();
        self.last = next;
        next
    }
}

impl<'a, T> IndexedIter<'a, T> {
    fn new(
        tree: &'a Octree<T>,
        from: NodeHandle,
        from_index: NodeIndex,
        step: IndexedStep<T>,
    ) -> Self {
        IndexedIter {
            tree,
            from,
            from_index,
            step,
            last: None,
            finished: false,
        }
    }
}

impl<'a, T> Iterator for IndexedIter<'a, T> {
    type Item = (NodeHandle, NodeIndex);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let next = (self.step)(self.tree, self.from, self.from_index, self.last);
        self.finished = next.is_none();
        self.last = next;
        next
    }
}
