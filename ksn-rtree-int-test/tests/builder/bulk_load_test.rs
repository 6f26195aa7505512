//! Sort-Tile-Recursive bulk loading through the builder.

use ksn_rtree::{Entry, Node, Point, RTree, Rectangle};
use ksn_rtree_int_test::test_util::{
    assert_node_invariants, brute_force_intersecting, leaf_depths, multiset, point_entry,
    random_points, random_rectangle, rect_entry, sorted_values,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn leaf_sizes<V, G>(tree: &RTree<V, G>) -> Vec<usize> {
    fn walk<V, G>(node: &Node<V, G>, out: &mut Vec<usize>) {
        match node {
            Node::Leaf(leaf) => out.push(leaf.entries().len()),
            Node::NonLeaf(non_leaf) => non_leaf.children().iter().for_each(|c| walk(c, out)),
        }
    }

    let mut sizes = Vec::new();
    if let Some(root) = tree.root() {
        walk(root, &mut sizes);
    }
    sizes
}

#[test]
fn test_create_with_default_configuration() {
    let tree = RTree::create((0..100).map(|i| point_entry(i, (i % 10) as i32, (i / 10) as i32)));
    assert_eq!(tree.size(), 100);
    assert_eq!(tree.mbr(), Some(Rectangle::new(0, 0, 9, 9)));
    assert_node_invariants(&tree);

    // round(4 * 0.7) = 3 entries per leaf
    let sizes = leaf_sizes(&tree);
    assert_eq!(sizes.len(), 34);
    assert!(sizes.iter().all(|&s| s <= 3));
}

#[test]
fn test_create_with_full_nodes() {
    let tree = RTree::<u64, Point>::builder()
        .max_children(8)
        .loading_factor(1.0)
        .create((0..64).map(|i| point_entry(i, (i % 8) as i32, (i / 8) as i32)))
        .expect("valid configuration");

    assert_eq!(leaf_sizes(&tree), vec![8; 8]);
    assert_eq!(tree.calculate_depth(), 2);
    assert_node_invariants(&tree);
}

#[test]
fn test_leaves_are_spatially_tiled() {
    let tree = RTree::<u64, Point>::builder()
        .max_children(4)
        .loading_factor(1.0)
        .create((0..16).map(|i| point_entry(i, (i % 4) as i32 * 10, (i / 4) as i32 * 10)))
        .expect("valid configuration");

    // sixteen points on a 4x4 grid pack into four 2x2 squares
    let root = tree.root().expect("root");
    let Node::NonLeaf(non_leaf) = root else {
        panic!("expected a non-leaf root");
    };
    let mut mbrs: Vec<Rectangle> = non_leaf.children().iter().map(|c| c.mbr()).collect();
    mbrs.sort_by_key(|r| (r.x1(), r.y1()));
    assert_eq!(
        mbrs,
        vec![
            Rectangle::new(0, 0, 10, 10),
            Rectangle::new(0, 20, 10, 30),
            Rectangle::new(20, 0, 30, 10),
            Rectangle::new(20, 20, 30, 30),
        ]
    );
}

#[test]
fn test_bulk_load_is_balanced_and_searchable() {
    let mut rng = StdRng::seed_from_u64(7);
    let entries = random_points(&mut rng, 5_000, 2_000);
    let tree = RTree::<u64, Point>::builder()
        .max_children(16)
        .create(entries.clone())
        .expect("valid configuration");

    let depths = leaf_depths(&tree);
    assert!(depths.iter().all(|&d| d == depths[0]));
    assert_node_invariants(&tree);
    assert_eq!(multiset(tree.entries()), multiset(&entries));

    for _ in 0..25 {
        let query = random_rectangle(&mut rng, 2_000, 200);
        assert_eq!(
            sorted_values(tree.search_intersecting(&query)),
            sorted_values(brute_force_intersecting(&entries, &query))
        );
    }
}

#[test]
fn test_create_empty_and_single() {
    let empty: RTree<u64, Rectangle> = RTree::create(Vec::new());
    assert!(empty.is_empty());
    assert!(empty.root().is_none());

    let single = RTree::create(vec![rect_entry(1, 0, 0, 2, 2)]);
    assert_eq!(single.size(), 1);
    assert_eq!(single.calculate_depth(), 1);
    assert!(single.root().expect("root").is_leaf());
}

#[test]
fn test_bulk_loaded_tree_accepts_adds_and_deletes() {
    let entries: Vec<Entry<u64, Point>> =
        (0..300).map(|i| point_entry(i, (i % 20) as i32, (i / 20) as i32)).collect();
    let tree = RTree::create(entries.clone());

    let grown = tree.add_entries((300..400).map(|i| point_entry(i, 50, i as i32)));
    assert_eq!(grown.size(), 400);
    assert_node_invariants(&grown);

    let pruned = grown.delete_entries(&entries[..150], false);
    assert_eq!(pruned.size(), 250);
    assert_node_invariants(&pruned);
    let depths = leaf_depths(&pruned);
    assert!(depths.iter().all(|&d| d == depths[0]));
}

#[test]
fn test_collect_into_tree() {
    let tree: RTree<u64, Point> = (0..10).map(|i| point_entry(i, i as i32, 0)).collect();
    assert_eq!(tree.size(), 10);
    assert_eq!(
        sorted_values(tree.search_intersecting(&Rectangle::new(2, 0, 4, 0))),
        vec![2, 3, 4]
    );
}
