use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use super::*;

fn octants(path: &[usize]) -> Vec<Octant> {
    path.iter().map(|&o| Octant::from_index(o)).collect()
}

fn full_tree(depth: u32) -> Octree<u32> {
    let mut tree = Octree::new();
    let root = tree.root();
    tree.set_full_depth(root, depth).unwrap();
    tree
}

/// A tree refined unevenly: full to depth 2, with a few branches going down to depth 4.
fn adaptive_tree() -> Octree<u32> {
    let mut tree = full_tree(2);
    let root = tree.root();
    for path in &[[0, 7, 7, 1], [7, 0, 0, 6], [3, 4, 2, 5], [5, 5, 5, 5]] {
        tree.ensure_path(root, &octants(path)).unwrap();
    }
    tree
}

/// Per-axis step from a cell to the cell across the given side bits. Axes not named stay put.
fn step(index: NodeIndex, deltas: [i64; 3]) -> Option<NodeIndex> {
    let limit = 1i64 << index.depth;
    let mut offset = [0u32; 3];
    for axis in 0..3 {
        let o = index.offset[axis] as i64 + deltas[axis];
        if o < 0 || o >= limit {
            return None;
        }
        offset[axis] = o as u32;
    }
    Some(NodeIndex {
        depth: index.depth,
        offset,
    })
}

fn side_delta(side: usize) -> i64 {
    if side == 1 {
        1
    } else {
        -1
    }
}

fn face_deltas(face: Face) -> [i64; 3] {
    let mut deltas = [0; 3];
    deltas[face.axis().index()] = side_delta(face.side());
    deltas
}

fn edge_deltas(edge: Edge) -> [i64; 3] {
    let (axis, sides) = edge.factor();
    let [a, b] = axis.others();
    let mut deltas = [0; 3];
    deltas[a.index()] = side_delta(sides[0]);
    deltas[b.index()] = side_delta(sides[1]);
    deltas
}

fn corner_deltas(corner: Octant) -> [i64; 3] {
    let [x, y, z] = corner.factor();
    [side_delta(x), side_delta(y), side_delta(z)]
}

/// True if the cell at `outer` contains the cell at `inner`.
fn covers(outer: NodeIndex, inner: NodeIndex) -> bool {
    if outer.depth > inner.depth {
        return false;
    }
    let shift = inner.depth - outer.depth;
    (0..3).all(|axis| inner.offset[axis] >> shift == outer.offset[axis])
}

/// Checks a probing query against the geometric neighbor of `node`.
fn check_probe<T>(
    tree: &Octree<T>,
    node: NodeHandle,
    deltas: [i64; 3],
    found: Option<NodeHandle>,
) {
    let index = tree.index_of(node);
    match (step(index, deltas), found) {
        (None, None) => {}
        (Some(expected), Some(found)) => {
            let found_index = tree.index_of(found);
            assert!(
                covers(found_index, expected),
                "{:?} does not cover the neighbor {:?} of {:?}",
                found_index,
                expected,
                index
            );
            assert!(found_index.depth == index.depth || tree.is_leaf(found));
        }
        (expected, found) => panic!(
            "neighbor of {:?} with deltas {:?}: expected {:?}, found {:?}",
            index, deltas, expected, found
        ),
    }
}

fn check_all_probes<T>(tree: &Octree<T>) {
    for node in tree.iter_nodes(tree.root()) {
        for face in Face::enumerate() {
            check_probe(tree, node, face_deltas(face), tree.face_neighbor(node, face));
        }
        for edge in Edge::enumerate() {
            check_probe(tree, node, edge_deltas(edge), tree.edge_neighbor(node, edge));
        }
        for corner in Octant::enumerate().iter() {
            check_probe(
                tree,
                node,
                corner_deltas(*corner),
                tree.corner_neighbor(node, *corner),
            );
        }
    }
}

#[test]
fn test_full_depth_counts() {
    let tree = full_tree(2);
    let root = tree.root();
    assert_eq!(tree.nodes(root), 73);
    assert_eq!(tree.leaves(root), 64);
    assert_eq!(tree.max_depth(root), 2);
    assert_eq!(tree.len(), 73);

    let internal = tree
        .iter_nodes(root)
        .filter(|&node| !tree.is_leaf(node))
        .count();
    assert_eq!(tree.nodes(root), tree.leaves(root) + internal);

    let children = tree.children(root).unwrap();
    assert_eq!(
        tree.nodes(root),
        1 + children.iter().map(|&c| tree.nodes(c)).sum::<usize>()
    );
}

#[test]
fn test_fresh_root() {
    let tree: Octree<u32> = Octree::new();
    let root = tree.root();
    assert!(tree.is_leaf(root));
    assert_eq!(tree.parent(root), None);
    assert_eq!(tree.octant(root), None);
    assert_eq!(tree.nodes(root), 1);
    assert_eq!(tree.leaves(root), 1);
    assert_eq!(tree.max_depth(root), 0);
    assert_eq!(tree.next_node(root, None), Some(root));
    assert_eq!(tree.next_node(root, Some(root)), None);
    assert_eq!(tree.next_leaf(root, None), Some(root));
    assert_eq!(tree.next_leaf(root, Some(root)), None);
    assert_eq!(tree.face_neighbor(root, Face::from_index(0)), None);
}

#[test]
fn test_delete_children() {
    let mut tree = full_tree(2);
    let root = tree.root();
    let seven = tree.child(root, Octant::from_index(7)).unwrap();
    tree.delete_children(seven);
    assert!(tree.is_leaf(seven));
    assert_eq!(tree.leaves(root), 64 - 8 + 1);
    assert_eq!(tree.len(), 65);

    // deleting a leaf's children does nothing
    tree.delete_children(seven);
    assert_eq!(tree.leaves(root), 57);

    tree.delete_children(root);
    assert_eq!(tree.nodes(root), 1);
    assert_eq!(tree.len(), 1);
    assert!(!tree.contains(seven));
}

#[test]
fn test_child_parent_links() {
    let tree = adaptive_tree();
    for node in tree.iter_nodes(tree.root()) {
        let index = tree.index_of(node);
        if let Some(children) = tree.children(node) {
            for (octant, &child) in Octant::enumerate().iter().zip(children.iter()) {
                assert_eq!(tree.parent(child), Some(node));
                assert_eq!(tree.octant(child), Some(*octant));
                assert_eq!(tree.child(node, *octant), Some(child));
                assert_eq!(tree.index_of(child), index.child(*octant));
                assert_eq!(tree.index_of(child).parent(), index);
            }
        }
        assert_eq!(tree.root_of(node), tree.root());
        assert_eq!(tree.depth(node), index.depth);
    }
}

#[test]
fn test_init_children_discards_subtree() {
    let mut tree = full_tree(3);
    let root = tree.root();
    let child = tree.child(root, Octant::from_index(2)).unwrap();
    let grandchild = tree.child(child, Octant::from_index(4)).unwrap();
    *tree.data_mut(grandchild) = 17;

    tree.init_children(child).unwrap();
    assert_eq!(tree.max_depth(child), 1);
    assert_eq!(tree.nodes(child), 9);

    let grandchild = tree.child(child, Octant::from_index(4)).unwrap();
    assert_eq!(*tree.data(grandchild), 0);
    assert_eq!(tree.len(), tree.nodes(root));
}

#[test]
fn test_blocks_are_reused() {
    let mut tree = full_tree(1);
    let root = tree.root();
    let child = tree.child(root, Octant::from_index(0)).unwrap();
    tree.init_children(child).unwrap();
    let first = tree.first_child(child).unwrap();

    tree.delete_children(child);
    let other = tree.child(root, Octant::from_index(1)).unwrap();
    tree.init_children(other).unwrap();
    assert_eq!(tree.first_child(other), Some(first));
    assert_eq!(tree.parent(first), Some(other));
    assert_eq!(tree.len(), 17);
}

#[test]
fn test_max_depth_leaves() {
    let tree = adaptive_tree();
    let root = tree.root();
    assert_eq!(tree.max_depth_leaves(root, 0), 1);
    assert_eq!(tree.max_depth_leaves(root, 1), 8);
    assert_eq!(tree.max_depth_leaves(root, 2), 64);
    assert_eq!(tree.max_depth_leaves(root, 4), tree.leaves(root));
    assert_eq!(tree.max_depth_leaves(root, 10), tree.leaves(root));
}

#[test]
fn test_preorder() {
    let tree = adaptive_tree();
    let root = tree.root();
    let order: Vec<NodeHandle> = tree.iter_nodes(root).collect();
    assert_eq!(order.len(), tree.nodes(root));

    let position: HashMap<NodeHandle, usize> =
        order.iter().enumerate().map(|(i, &node)| (node, i)).collect();
    assert_eq!(position.len(), order.len());

    for (i, &node) in order.iter().enumerate() {
        if let Some(parent) = tree.parent(node) {
            assert!(position[&parent] < i);
        }
    }

    // siblings appear in octant order
    let children = tree.children(root).unwrap();
    for pair in children.windows(2) {
        assert!(position[&pair[0]] < position[&pair[1]]);
    }
}

#[test]
fn test_leaves_in_order() {
    let tree = adaptive_tree();
    let root = tree.root();
    let leaves: Vec<NodeHandle> = tree.iter_leaves(root).collect();
    let expected: Vec<NodeHandle> = tree
        .iter_nodes(root)
        .filter(|&node| tree.is_leaf(node))
        .collect();
    assert_eq!(leaves, expected);
    assert_eq!(leaves.len(), tree.leaves(root));
}

#[test]
fn test_resume_traversal() {
    let tree = adaptive_tree();
    let root = tree.root();
    let leaves: Vec<NodeHandle> = tree.iter_leaves(root).collect();

    for (i, &leaf) in leaves.iter().enumerate() {
        assert_eq!(tree.next_leaf(root, Some(leaf)), leaves.get(i + 1).copied());
    }

    // resuming from an internal node descends to its leftmost leaf
    let internal = tree.child(root, Octant::from_index(5)).unwrap();
    let first = tree.next_leaf(root, Some(internal)).unwrap();
    assert_eq!(tree.parent(first), Some(internal));
    assert_eq!(tree.octant(first), Some(Octant::from_index(0)));
}

#[test]
fn test_subtree_traversal() {
    let tree = adaptive_tree();
    let root = tree.root();
    let from = tree.node_at_path(root, &octants(&[3])).unwrap();

    let nodes: Vec<NodeHandle> = tree.iter_nodes(from).collect();
    assert_eq!(nodes.len(), tree.nodes(from));
    assert!(nodes.iter().all(|&node| {
        let mut current = node;
        loop {
            if current == from {
                break true;
            }
            match tree.parent(current) {
                Some(parent) => current = parent,
                None => break false,
            }
        }
    }));

    assert_eq!(tree.iter_leaves(from).count(), tree.leaves(from));
    let last_child = tree.child(from, Octant::from_index(7)).unwrap();
    assert_eq!(tree.next_branch(from, last_child), None);
    assert_eq!(tree.next_branch(from, from), None);
}

#[test]
fn test_indexed_traversal() {
    let tree = adaptive_tree();
    let root = tree.root();

    let indexed: Vec<(NodeHandle, NodeIndex)> =
        tree.iter_nodes_indexed(root, NodeIndex::root()).collect();
    assert_eq!(indexed.len(), tree.nodes(root));
    for &(node, index) in &indexed {
        assert_eq!(index, tree.index_of(node));
    }

    let leaves: Vec<(NodeHandle, NodeIndex)> =
        tree.iter_leaves_indexed(root, NodeIndex::root()).collect();
    assert_eq!(leaves.len(), tree.leaves(root));
    for &(leaf, index) in &leaves {
        assert!(tree.is_leaf(leaf));
        assert_eq!(index, tree.index_of(leaf));
    }

    let from = tree.node_at_path(root, &octants(&[7, 0])).unwrap();
    let from_index = tree.index_of(from);
    for (node, index) in tree.iter_nodes_indexed(from, from_index) {
        assert_eq!(index, tree.index_of(node));
    }
}

#[test]
fn test_sibling_face_neighbor() {
    let tree = full_tree(2);
    let root = tree.root();
    let node = tree.node_at_path(root, &octants(&[0, 0])).unwrap();
    let neighbor = tree.face_neighbor(node, Face::new(Axis::X, 1)).unwrap();
    assert_eq!(tree.parent(neighbor), tree.parent(node));
    assert_eq!(tree.octant(neighbor), Some(Octant::from_index(1)));

    // the far side of the same node is the boundary of the root
    assert_eq!(tree.face_neighbor(node, Face::new(Axis::X, 0)), None);
}

#[test]
fn test_face_neighbor_across_parents() {
    let tree = full_tree(2);
    let root = tree.root();
    let node = tree.node_at_path(root, &octants(&[0, 1])).unwrap();
    let neighbor = tree.face_neighbor(node, Face::new(Axis::X, 1)).unwrap();
    assert_eq!(
        Some(neighbor),
        tree.node_at_path(root, &octants(&[1, 0]))
    );
}

#[test]
fn test_probes_match_geometry() {
    check_all_probes(&full_tree(2));
    check_all_probes(&adaptive_tree());
}

#[test]
fn test_probe_stops_at_coarse_leaf() {
    let tree = adaptive_tree();
    let root = tree.root();
    let deep = tree.node_at_path(root, &octants(&[0, 7, 7, 1])).unwrap();

    // +x of [0, 7, 7, 1] lies in [1, 6, ...], which is only refined to depth 2
    let neighbor = tree.face_neighbor(deep, Face::new(Axis::X, 1)).unwrap();
    assert_eq!(Some(neighbor), tree.node_at_path(root, &octants(&[1, 6])));
    assert!(tree.is_leaf(neighbor));
}

#[test]
fn test_face_symmetry() {
    let tree = adaptive_tree();
    for node in tree.iter_nodes(tree.root()) {
        for face in Face::enumerate() {
            if let Some(neighbor) = tree.face_neighbor(node, face) {
                if tree.depth(neighbor) == tree.depth(node) {
                    assert_eq!(tree.face_neighbor(neighbor, face.opposite()), Some(node));
                }
            }
        }
    }
}

#[test]
fn test_forced_neighbors() {
    let mut tree = full_tree(1);
    let root = tree.root();
    let deep = tree.ensure_path(root, &octants(&[0, 7, 7, 7])).unwrap();
    let index = tree.index_of(deep);

    for face in Face::enumerate() {
        let found = tree.force_face_neighbor(deep, face).unwrap();
        assert_eq!(found.map(|n| tree.index_of(n)), step(index, face_deltas(face)));
    }
    for edge in Edge::enumerate() {
        let found = tree.force_edge_neighbor(deep, edge).unwrap();
        assert_eq!(found.map(|n| tree.index_of(n)), step(index, edge_deltas(edge)));
    }
    for corner in Octant::enumerate().iter() {
        let found = tree.force_corner_neighbor(deep, *corner).unwrap();
        assert_eq!(
            found.map(|n| tree.index_of(n)),
            step(index, corner_deltas(*corner))
        );
    }

    // after forcing every relation, probing finds the same nodes without refining further
    let nodes = tree.nodes(root);
    let found = tree.corner_neighbor(deep, Octant::from_index(7)).unwrap();
    assert_eq!(tree.depth(found), 4);
    assert_eq!(tree.nodes(root), nodes);
    check_all_probes(&tree);
}

#[test]
fn test_forced_neighbor_outside_root() {
    let mut tree = full_tree(1);
    let root = tree.root();
    let node = tree.ensure_path(root, &octants(&[0, 0])).unwrap();
    let nodes = tree.nodes(root);
    assert_eq!(tree.force_corner_neighbor(node, Octant::from_index(0)).unwrap(), None);
    assert_eq!(tree.force_face_neighbor(root, Face::from_index(3)).unwrap(), None);
    assert_eq!(tree.nodes(root), nodes);
}

#[test]
fn test_shared_corner_keys() {
    let tree = full_tree(1);
    let root = tree.root();
    let a = tree.child(root, Octant::from_index(0)).unwrap();
    let b = tree.child(root, Octant::from_index(1)).unwrap();

    // corner 1 of octant 0 is corner 0 of octant 1
    assert_eq!(
        tree.corner_key(a, Octant::from_index(1), 4),
        tree.corner_key(b, Octant::from_index(0), 4)
    );
    assert_ne!(
        tree.corner_key(a, Octant::from_index(0), 4),
        tree.corner_key(b, Octant::from_index(0), 4)
    );
}

#[test]
fn test_corner_keys_match_positions() {
    let tree = adaptive_tree();
    let root = tree.root();
    let mut by_key: HashMap<u64, (u64, u64, u64)> = HashMap::new();

    for (leaf, index) in tree.iter_leaves_indexed(root, NodeIndex::root()) {
        assert_eq!(index, tree.index_of(leaf));
        for corner in Octant::enumerate().iter() {
            let key = corner_key(index, *corner, 4);
            let p = index.corner_position(*corner);
            // positions are exact multiples of 1/16
            let grid = ((p.x * 16.0) as u64, (p.y * 16.0) as u64, (p.z * 16.0) as u64);
            let previous = by_key.entry(key).or_insert(grid);
            assert_eq!(*previous, grid);
        }
    }

    let distinct: HashSet<(u64, u64, u64)> = by_key.values().copied().collect();
    assert_eq!(distinct.len(), by_key.len());
}

proptest! {
    #[test]
    fn prop_index_child_parent(
        path in proptest::collection::vec(0usize..8, 0..12),
        octant in 0usize..8,
    ) {
        let index = octants(&path)
            .into_iter()
            .fold(NodeIndex::root(), |index, octant| index.child(octant));
        let octant = Octant::from_index(octant);
        prop_assert!(index.is_valid());
        prop_assert_eq!(index.child(octant).parent(), index);
        prop_assert_eq!(index.child(octant).octant(), octant);
    }

    #[test]
    fn prop_random_trees(
        paths in proptest::collection::vec(proptest::collection::vec(0usize..8, 1..5), 0..6),
    ) {
        let mut tree: Octree<()> = Octree::new();
        let root = tree.root();
        for path in &paths {
            tree.ensure_path(root, &octants(path)).unwrap();
        }

        prop_assert_eq!(tree.len(), tree.nodes(root));
        prop_assert_eq!(tree.iter_nodes(root).count(), tree.nodes(root));
        check_all_probes(&tree);
    }
}
