//! Custom selectors, splitters and factories plugged in through the builder.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ksn_rtree::{
    DefaultFactory, Entry, Factory, ListPair, Node, Point, RTree, Rectangle, Selector, Splitter,
};
use ksn_rtree_int_test::test_util::{
    assert_node_invariants, brute_force_intersecting, leaf_depths, multiset, random_points,
    random_rectangle, sorted_values,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug)]
struct FirstChildSelector;

impl<V, G> Selector<V, G> for FirstChildSelector {
    fn select(&self, _mbr: &Rectangle, _nodes: &[Arc<Node<V, G>>]) -> usize {
        0
    }
}

#[derive(Debug)]
struct PastTheEndSelector;

impl<V, G> Selector<V, G> for PastTheEndSelector {
    fn select(&self, _mbr: &Rectangle, nodes: &[Arc<Node<V, G>>]) -> usize {
        nodes.len()
    }
}

/// Sorts by the left edge and cuts in the middle.
#[derive(Debug)]
struct HalvingSplitter;

impl Splitter for HalvingSplitter {
    fn split(&self, mbrs: &[Rectangle], _min_size: usize) -> ListPair<usize> {
        let mut indices: Vec<usize> = (0..mbrs.len()).collect();
        indices.sort_by_key(|&i| mbrs[i].x1());
        let group2 = indices.split_off(indices.len() / 2);
        ListPair::new(indices, group2)
    }
}

#[derive(Debug, Default)]
struct CountingFactory {
    leaves: AtomicUsize,
    non_leaves: AtomicUsize,
}

/// Local handle so the foreign `Factory` trait can be implemented for a shared counter.
#[derive(Debug)]
struct SharedCountingFactory(Arc<CountingFactory>);

impl Factory<u64, Point> for SharedCountingFactory {
    fn create_leaf(&self, entries: Vec<Entry<u64, Point>>) -> Node<u64, Point> {
        self.0.leaves.fetch_add(1, Ordering::SeqCst);
        DefaultFactory.create_leaf(entries)
    }

    fn create_non_leaf(&self, children: Vec<Arc<Node<u64, Point>>>) -> Node<u64, Point> {
        self.0.non_leaves.fetch_add(1, Ordering::SeqCst);
        DefaultFactory.create_non_leaf(children)
    }
}

fn data(seed: u64) -> Vec<Entry<u64, Point>> {
    random_points(&mut StdRng::seed_from_u64(seed), 1_000, 500)
}

fn assert_matches_brute_force(tree: &RTree<u64, Point>, entries: &[Entry<u64, Point>]) {
    assert_eq!(multiset(tree.entries()), multiset(entries));
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..25 {
        let query = random_rectangle(&mut rng, 500, 100);
        assert_eq!(
            sorted_values(tree.search_intersecting(&query)),
            sorted_values(brute_force_intersecting(entries, &query))
        );
    }
}

#[test]
fn test_custom_selector_keeps_results_correct() {
    let entries = data(1);
    let tree = RTree::<u64, Point>::builder()
        .selector(FirstChildSelector)
        .build()
        .expect("valid configuration")
        .add_entries(entries.clone());

    assert_node_invariants(&tree);
    let depths = leaf_depths(&tree);
    assert!(depths.iter().all(|&d| d == depths[0]));
    assert_matches_brute_force(&tree, &entries);
}

#[test]
fn test_custom_splitter_keeps_results_correct() {
    let entries = data(2);
    let tree = RTree::<u64, Point>::builder()
        .max_children(8)
        .splitter(HalvingSplitter)
        .build()
        .expect("valid configuration")
        .add_entries(entries.clone());

    assert_node_invariants(&tree);
    assert_matches_brute_force(&tree, &entries);

    let pruned = tree.delete_entries(&entries[..500], false);
    assert_matches_brute_force(&pruned, &entries[500..]);
}

#[test]
fn test_custom_factory_sees_every_node() {
    let counter = Arc::new(CountingFactory::default());
    let tree = RTree::<u64, Point>::builder()
        .factory(SharedCountingFactory(Arc::clone(&counter)))
        .loading_factor(1.0)
        .create((0..64).map(|i| Entry::new(i, Point::new((i % 8) as i32, (i / 8) as i32))))
        .expect("valid configuration");

    // 16 leaves of 4, 4 parents, 1 root
    assert_eq!(tree.size(), 64);
    assert_eq!(counter.leaves.load(Ordering::SeqCst), 16);
    assert_eq!(counter.non_leaves.load(Ordering::SeqCst), 5);

    let grown = tree.add(Entry::new(64, Point::new(100, 100)));
    assert_eq!(grown.size(), 65);
    assert!(counter.leaves.load(Ordering::SeqCst) > 16);
    assert!(counter.non_leaves.load(Ordering::SeqCst) > 5);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "selected child")]
fn test_out_of_range_selector_is_caught() {
    let tree = RTree::<u64, Point>::builder()
        .selector(PastTheEndSelector)
        .build()
        .expect("valid configuration");
    // the fifth entry splits the root leaf, the sixth goes through the selector
    let _ = tree.add_entries(data(3));
}

#[test]
#[cfg(not(debug_assertions))]
fn test_out_of_range_selector_is_clamped() {
    let entries = data(3);
    let tree = RTree::<u64, Point>::builder()
        .selector(PastTheEndSelector)
        .build()
        .expect("valid configuration")
        .add_entries(entries.clone());
    assert_node_invariants(&tree);
    assert_matches_brute_force(&tree, &entries);
}
