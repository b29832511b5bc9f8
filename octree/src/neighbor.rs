//! Face, edge and corner neighbors at the depth of the queried node.
//!
//! Each query first checks whether the neighbor is a sibling of the node. If not, the neighbor's
//! parent is the parent's own neighbor across a face, edge or corner of the parent, which is
//! found recursively, and the answer is one of its children. Which relation to ask the parent
//! for depends on which axes the requested relation puts on the parent's boundary: an axis is on
//! the boundary when the node's octant bit for it agrees with the relation's side bit.
//!
//! Queries come in two flavors. Probing (`face_neighbor` etc.) never modifies the tree: when the
//! neighbor region is not refined down to the node's depth it returns the leaf covering it.
//! Forcing (`force_face_neighbor` etc.) creates children along the way, so its result is always
//! at exactly the node's depth. Either returns `None` when the neighbor lies outside the root.

use std::convert::Infallible;

use anyhow::Result;

use isotree_util::{Axis, Edge, Face, Octant};

use crate::tree::{NodeHandle, Octree};

/// Drives a neighbor search. `descend` is asked to step from an ancestor's neighbor into one of
/// its children.
trait Resolver {
    type Payload;
    type Error;

    fn tree(&self) -> &Octree<Self::Payload>;

    fn descend(&mut self, node: NodeHandle, octant: Octant) -> Result<NodeHandle, Self::Error>;
}

/// Stops at leaves.
struct Probe<'a, T>(&'a Octree<T>);

/// Creates children at leaves.
struct Refine<'a, T>(&'a mut Octree<T>);

impl<'a, T> Resolver for Probe<'a, T> {
    type Payload = T;
    type Error = Infallible;

    fn tree(&self) -> &Octree<T> {
        self.0
    }

    fn descend(&mut self, node: NodeHandle, octant: Octant) -> Result<NodeHandle, Infallible> {
        Ok(self.0.child(node, octant).unwrap_or(node))
    }
}

impl<'a, T: Default> Resolver for Refine<'a, T> {
    type Payload = T;
    type Error = anyhow::Error;

    fn tree(&self) -> &Octree<T> {
        &*self.0
    }

    fn descend(&mut self, node: NodeHandle, octant: Octant) -> Result<NodeHandle> {
        let first = match self.0.first_child(node) {
            Some(first) => first,
            None => {
                log::debug!("refining {:?} to reach a neighbor", node);
                self.0.alloc_children(node)?
            }
        };
        Ok(self.0.sibling(first, octant))
    }
}

fn probe<T, F>(tree: &Octree<T>, query: F) -> Option<NodeHandle>
where
    F: FnOnce(&mut Probe<T>) -> Result<Option<NodeHandle>, Infallible>,
{
    match query(&mut Probe(tree)) {
        Ok(found) => found,
        Err(never) => match never {},
    }
}

fn face<R: Resolver>(
    resolver: &mut R,
    node: NodeHandle,
    face: Face,
) -> Result<Option<NodeHandle>, R::Error> {
    let (parent, octant) = match resolver.tree().slot(node) {
        None => return Ok(None),
        Some(slot) => slot,
    };

    let axis = face.axis();
    let target = octant.flip(axis);
    if target.bit(axis) == face.side() {
        return Ok(Some(resolver.tree().sibling(node, target)));
    }

    match self::face(resolver, parent, face)? {
        None => Ok(None),
        Some(outer) => resolver.descend(outer, target).map(Some),
    }
}

fn edge<R: Resolver>(
    resolver: &mut R,
    node: NodeHandle,
    edge: Edge,
) -> Result<Option<NodeHandle>, R::Error> {
    let (parent, octant) = match resolver.tree().slot(node) {
        None => return Ok(None),
        Some(slot) => slot,
    };

    let (axis, sides) = edge.factor();
    let [a, b] = axis.others();
    let agree = !((sides[0] ^ octant.bit(a)) | (sides[1] ^ octant.bit(b)) << 1) & 3;
    let target = octant.flip(a).flip(b);

    let outer = match agree {
        0 => return Ok(Some(resolver.tree().sibling(node, target))),
        1 => face(resolver, parent, Face::new(a, sides[0]))?,
        2 => face(resolver, parent, Face::new(b, sides[1]))?,
        _ => self::edge(resolver, parent, edge)?,
    };

    match outer {
        None => Ok(None),
        Some(outer) => resolver.descend(outer, target).map(Some),
    }
}

fn corner<R: Resolver>(
    resolver: &mut R,
    node: NodeHandle,
    corner: Octant,
) -> Result<Option<NodeHandle>, R::Error> {
    let (parent, octant) = match resolver.tree().slot(node) {
        None => return Ok(None),
        Some(slot) => slot,
    };

    let disagree = corner.as_index() ^ octant.as_index();
    let agree = !disagree & 7;
    let target = octant.opposite();

    let outer = match agree.count_ones() {
        0 => return Ok(Some(resolver.tree().sibling(node, target))),
        1 => {
            let axis = Axis::from_index(agree.trailing_zeros() as usize);
            face(resolver, parent, Face::new(axis, corner.bit(axis)))?
        }
        2 => {
            let axis = Axis::from_index(disagree.trailing_zeros() as usize);
            let [a, b] = axis.others();
            edge(resolver, parent, Edge::new(axis, corner.bit(a), corner.bit(b)))?
        }
        _ => self::corner(resolver, parent, corner)?,
    };

    match outer {
        None => Ok(None),
        Some(outer) => resolver.descend(outer, target).map(Some),
    }
}

impl<T> Octree<T> {
    /// The node across `face` of `node`, or the leaf covering that region if it is coarser.
    pub fn face_neighbor(&self, node: NodeHandle, face: Face) -> Option<NodeHandle> {
        probe(self, |resolver| self::face(resolver, node, face))
    }

    /// The node across `edge` of `node`, or the leaf covering that region if it is coarser.
    pub fn edge_neighbor(&self, node: NodeHandle, edge: Edge) -> Option<NodeHandle> {
        probe(self, |resolver| self::edge(resolver, node, edge))
    }

    /// The node diagonally across `corner` of `node`, or the leaf covering that region if it is
    /// coarser.
    pub fn corner_neighbor(&self, node: NodeHandle, corner: Octant) -> Option<NodeHandle> {
        probe(self, |resolver| self::corner(resolver, node, corner))
    }

    /// The node across `face` of `node` at the same depth, refining the tree as needed.
    pub fn force_face_neighbor(
        &mut self,
        node: NodeHandle,
        face: Face,
    ) -> Result<Option<NodeHandle>>
    where
        T: Default,
    {
        self::face(&mut Refine(self), node, face)
    }

    /// The node across `edge` of `node` at the same depth, refining the tree as needed.
    pub fn force_edge_neighbor(
        &mut self,
        node: NodeHandle,
        edge: Edge,
    ) -> Result<Option<NodeHandle>>
    where
        T: Default,
    {
        self::edge(&mut Refine(self), node, edge)
    }

    /// The node across `corner` of `node` at the same depth, refining the tree as needed.
    pub fn force_corner_neighbor(
        &mut self,
        node: NodeHandle,
        corner: Octant,
    ) -> Result<Option<NodeHandle>>
    where
        T: Default,
    {
        self::corner(&mut Refine(self), node, corner)
    }
}
