use std::collections::TryReserveError;

use anyhow::{Context, Result};

use isotree_util::{Octant, CORNERS};

use crate::index::NodeIndex;

/// An octree in which every internal node has all 8 children. Nodes live in an arena and are
/// addressed by `NodeHandle`. The children of a node occupy a contiguous block of 8 slots, in
/// octant order, so a node's octant within its parent follows from its handle.
#[derive(Clone, Debug)]
pub struct Octree<T> {
    nodes: NodePool<T>,
}

/// Refers to a node of an `Octree`. A handle stays valid until the subtree containing it is
/// deleted; after that it may be reused for a newly created node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeHandle {
    index: usize,
}

#[derive(Clone, Debug)]
struct OctNode<T> {
    parent: Option<NodeHandle>,
    // first of 8 contiguous children
    children: Option<NodeHandle>,
    data: T,
}

#[derive(Clone, Debug)]
struct NodePool<T> {
    // slot 0 holds the root, blocks of 8 children start at 1 + 8k
    items: Vec<Option<OctNode<T>>>,
    free_blocks: Vec<usize>,
}

impl NodeHandle {
    const ROOT: NodeHandle = NodeHandle { index: 0 };

    #[inline]
    fn octant(self) -> Option<Octant> {
        if self.index == 0 {
            None
        } else {
            Some(Octant::from_index((self.index - 1) % CORNERS))
        }
    }

    /// The handle at the given octant of the block this handle belongs to.
    #[inline]
    fn sibling(self, octant: Octant) -> NodeHandle {
        let first = self.index - (self.index - 1) % CORNERS;
        NodeHandle {
            index: first + octant.as_index(),
        }
    }
}

impl<T> OctNode<T> {
    fn new(parent: Option<NodeHandle>, data: T) -> Self {
        OctNode {
            parent,
            children: None,
            data,
        }
    }
}

impl<T> NodePool<T> {
    fn new(root: OctNode<T>) -> Self {
        NodePool {
            items: vec![Some(root)],
            free_blocks: Vec::new(),
        }
    }

    fn len(&self) -> usize {
        self.items.len() - self.free_blocks.len() * CORNERS
    }

    fn get(&self, handle: NodeHandle) -> Option<&OctNode<T>> {
        self.items.get(handle.index).and_then(Option::as_ref)
    }

    /// Creates 8 childless nodes under `parent` and returns the handle of the first.
    fn alloc_block(&mut self, parent: NodeHandle) -> Result<NodeHandle, TryReserveError>
    where
        T: Default,
    {
        let first = match self.free_blocks.pop() {
            Some(first) => {
                for slot in &mut self.items[first..first + CORNERS] {
                    *slot = Some(OctNode::new(Some(parent), T::default()));
                }
                first
            }
            None => {
                self.items.try_reserve(CORNERS)?;
                let first = self.items.len();
                self.items.extend(
                    (0..CORNERS).map(|_| Some(OctNode::new(Some(parent), T::default()))),
                );
                first
            }
        };

        Ok(NodeHandle { index: first })
    }

    /// Drops the 8 nodes of the block starting at `first`. Their own children must already be
    /// released.
    fn release_block(&mut self, first: NodeHandle) {
        for slot in &mut self.items[first.index..first.index + CORNERS] {
            *slot = None;
        }
        self.free_blocks.push(first.index);
    }
}

impl<T> std::ops::Index<NodeHandle> for NodePool<T> {
    type Output = OctNode<T>;

    fn index(&self, handle: NodeHandle) -> &Self::Output {
        match self.get(handle) {
            Some(node) => node,
            None => panic!("{:?} does not refer to a live node", handle),
        }
    }
}

impl<T> std::ops::IndexMut<NodeHandle> for NodePool<T> {
    fn index_mut(&mut self, handle: NodeHandle) -> &mut Self::Output {
        match self.items.get_mut(handle.index).and_then(Option::as_mut) {
            Some(node) => node,
            None => panic!("{:?} does not refer to a live node", handle),
        }
    }
}

impl<T> Octree<T> {
    /// Creates a tree consisting of a single leaf root holding `data`.
    pub fn with_root_data(data: T) -> Self {
        Octree {
            nodes: NodePool::new(OctNode::new(None, data)),
        }
    }

    pub fn new() -> Self
    where
        T: Default,
    {
        Self::with_root_data(T::default())
    }

    #[inline]
    pub fn root(&self) -> NodeHandle {
        NodeHandle::ROOT
    }

    /// Number of live nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always has a root, so it is never empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn contains(&self, node: NodeHandle) -> bool {
        self.nodes.get(node).is_some()
    }

    #[inline]
    pub fn data(&self, node: NodeHandle) -> &T {
        &self.nodes[node].data
    }

    #[inline]
    pub fn data_mut(&mut self, node: NodeHandle) -> &mut T {
        &mut self.nodes[node].data
    }

    #[inline]
    pub fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.nodes[node].parent
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeHandle) -> bool {
        self.nodes[node].children.is_none()
    }

    /// The octant `node` occupies within its parent, or `None` for the root.
    #[inline]
    pub fn octant(&self, node: NodeHandle) -> Option<Octant> {
        self.parent(node).and(node.octant())
    }

    #[inline]
    pub fn child(&self, node: NodeHandle, octant: Octant) -> Option<NodeHandle> {
        self.nodes[node]
            .children
            .map(|first| first.sibling(octant))
    }

    #[inline]
    pub fn first_child(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.nodes[node].children
    }

    pub fn children(&self, node: NodeHandle) -> Option<[NodeHandle; 8]> {
        let first = self.nodes[node].children?;
        let mut children = [first; 8];
        for (octant, child) in Octant::enumerate().iter().zip(children.iter_mut()) {
            *child = first.sibling(*octant);
        }
        Some(children)
    }

    /// Parent of `node` together with the octant `node` occupies in it.
    #[inline]
    pub(crate) fn slot(&self, node: NodeHandle) -> Option<(NodeHandle, Octant)> {
        let parent = self.parent(node)?;
        Some((parent, node.octant()?))
    }

    /// The node sharing a parent with `node` at the given octant. `node` must not be the root.
    #[inline]
    pub(crate) fn sibling(&self, node: NodeHandle, octant: Octant) -> NodeHandle {
        node.sibling(octant)
    }

    /// Walks parent links up to the root of the tree containing `node`.
    pub fn root_of(&self, node: NodeHandle) -> NodeHandle {
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Number of parent links between `node` and the root.
    pub fn depth(&self, node: NodeHandle) -> u32 {
        let mut depth = 0;
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Derives the index of `node` by replaying, from the root, the octants on its path.
    pub fn index_of(&self, node: NodeHandle) -> NodeIndex {
        let mut path = Vec::new();
        let mut current = node;
        while let Some((parent, octant)) = self.slot(current) {
            path.push(octant);
            current = parent;
        }
        path.iter()
            .rev()
            .fold(NodeIndex::root(), |index, &octant| index.child(octant))
    }

    /// Follows the given octants down from `from`. Returns `None` if the path runs past a leaf.
    pub fn node_at_path(&self, from: NodeHandle, path: &[Octant]) -> Option<NodeHandle> {
        path.iter()
            .try_fold(from, |node, &octant| self.child(node, octant))
    }

    /// Follows the given octants down from `from`, creating children wherever the path runs past
    /// a leaf.
    pub fn ensure_path(&mut self, from: NodeHandle, path: &[Octant]) -> Result<NodeHandle>
    where
        T: Default,
    {
        let mut node = from;
        for &octant in path {
            let children = self.nodes[node].children;
            let first = match children {
                Some(first) => first,
                None => self.alloc_children(node)?,
            };
            node = first.sibling(octant);
        }
        Ok(node)
    }

    /// Gives `node` 8 fresh leaf children, discarding any subtree it already had.
    pub fn init_children(&mut self, node: NodeHandle) -> Result<()>
    where
        T: Default,
    {
        self.delete_children(node);
        self.alloc_children(node)?;
        Ok(())
    }

    pub(crate) fn alloc_children(&mut self, node: NodeHandle) -> Result<NodeHandle>
    where
        T: Default,
    {
        debug_assert!(self.is_leaf(node));
        let first = self
            .nodes
            .alloc_block(node)
            .map_err(|err| {
                log::warn!("failed to allocate children of {:?}: {}", node, err);
                err
            })
            .context("Allocating octree children")?;
        self.nodes[node].children = Some(first);
        Ok(first)
    }

    /// Releases the subtree below `node`, turning it into a leaf. Does nothing to a leaf.
    pub fn delete_children(&mut self, node: NodeHandle) {
        let first = match self.nodes[node].children.take() {
            None => return,
            Some(first) => first,
        };

        for octant in Octant::enumerate().iter() {
            self.delete_children(first.sibling(*octant));
        }
        self.nodes.release_block(first);
    }

    /// Expands the subtree at `node` so that every node down to `depth` levels below it exists.
    pub fn set_full_depth(&mut self, node: NodeHandle, depth: u32) -> Result<()>
    where
        T: Default,
    {
        log::debug!("filling {:?} to depth {}", node, depth);
        self.fill_depth(node, depth)
    }

    fn fill_depth(&mut self, node: NodeHandle, depth: u32) -> Result<()>
    where
        T: Default,
    {
        if depth == 0 {
            return Ok(());
        }

        let children = self.nodes[node].children;
        let first = match children {
            Some(first) => first,
            None => self.alloc_children(node)?,
        };
        for octant in Octant::enumerate().iter() {
            self.fill_depth(first.sibling(*octant), depth - 1)?;
        }
        Ok(())
    }

    /// Length of the longest path from `node` down to a leaf.
    pub fn max_depth(&self, node: NodeHandle) -> u32 {
        match self.children(node) {
            None => 0,
            Some(children) => {
                1 + children
                    .iter()
                    .map(|&child| self.max_depth(child))
                    .max()
                    .unwrap_or(0)
            }
        }
    }

    /// Number of nodes in the subtree at `node`, including `node`.
    pub fn nodes(&self, node: NodeHandle) -> usize {
        match self.children(node) {
            None => 1,
            Some(children) => 1 + children.iter().map(|&child| self.nodes(child)).sum::<usize>(),
        }
    }

    /// Number of leaves in the subtree at `node`.
    pub fn leaves(&self, node: NodeHandle) -> usize {
        match self.children(node) {
            None => 1,
            Some(children) => children.iter().map(|&child| self.leaves(child)).sum(),
        }
    }

    /// Number of leaves the subtree at `node` would have if every node `limit` levels below it
    /// were collapsed into a leaf.
    pub fn max_depth_leaves(&self, node: NodeHandle, limit: u32) -> usize {
        match self.children(node) {
            Some(children) if limit > 0 => children
                .iter()
                .map(|&child| self.max_depth_leaves(child, limit - 1))
                .sum(),
            _ => 1,
        }
    }
}

impl<T: Default> Default for Octree<T> {
    fn default() -> Self {
        Self::new()
    }
}
