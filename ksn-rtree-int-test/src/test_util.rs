use ksn_rtree::{Entry, Geometry, Node, Point, RTree, Rectangle, SpatialResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::env;
use std::hash::Hash;
use std::panic::{self, RefUnwindSafe};

/// Environment variable that pins randomized tests to a single seed.
pub const SEED_VAR: &str = "KSN_RTREE_TEST_SEED";

const DEFAULT_SEEDS: [u64; 3] = [1, 7, 42];

/// Runs a randomized test once per seed.
///
/// `before` builds the context for a seed, `test` checks it. A failure or
/// panic reports the seed so the run can be reproduced with
/// `KSN_RTREE_TEST_SEED=<seed>`.
pub fn run_test<B, T>(before: B, test: T)
where
    B: Fn(u64) -> SpatialResult<TestContext> + RefUnwindSafe,
    T: Fn(TestContext) -> SpatialResult<()> + RefUnwindSafe,
{
    for seed in test_seeds() {
        let result = panic::catch_unwind(|| before(seed).and_then(&test));
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => panic!("Test failed with seed {}: {}", seed, e),
            Err(panic_err) => {
                eprintln!("\n==================== TEST FAILED ====================");
                eprintln!("Seed: {} (rerun with {}={})", seed, SEED_VAR, seed);
                eprintln!("=====================================================\n");
                panic::resume_unwind(panic_err);
            }
        }
    }
}

fn test_seeds() -> Vec<u64> {
    match env::var(SEED_VAR).ok().and_then(|s| s.parse().ok()) {
        Some(seed) => vec![seed],
        None => DEFAULT_SEEDS.to_vec(),
    }
}

/// A seeded data set together with a tree holding it.
#[derive(Clone)]
pub struct TestContext {
    seed: u64,
    entries: Vec<Entry<u64, Rectangle>>,
    tree: RTree<u64, Rectangle>,
}

impl TestContext {
    pub fn new(seed: u64, entries: Vec<Entry<u64, Rectangle>>, tree: RTree<u64, Rectangle>) -> Self {
        Self {
            seed,
            entries,
            tree,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn entries(&self) -> &[Entry<u64, Rectangle>] {
        &self.entries
    }

    pub fn tree(&self) -> &RTree<u64, Rectangle> {
        &self.tree
    }

    /// A fresh generator derived from the context seed.
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed.wrapping_mul(31).wrapping_add(17))
    }
}

/// Bulk loads 2,000 random rectangles on a 1,000 x 1,000 grid.
pub fn create_test_context(seed: u64) -> SpatialResult<TestContext> {
    let entries = random_rectangles(&mut StdRng::seed_from_u64(seed), 2_000, 1_000, 20);
    let tree = RTree::builder().create(entries.clone())?;
    Ok(TestContext::new(seed, entries, tree))
}

/// Adds 500 random rectangles one by one to a tree with fan-out 6.
pub fn create_incremental_test_context(seed: u64) -> SpatialResult<TestContext> {
    let entries = random_rectangles(&mut StdRng::seed_from_u64(seed), 500, 1_000, 20);
    let tree = RTree::builder()
        .max_children(6)
        .build()?
        .add_entries(entries.clone());
    Ok(TestContext::new(seed, entries, tree))
}

/// Adds 300 rectangles spread over the whole `i32` grid one by one.
pub fn create_full_range_test_context(seed: u64) -> SpatialResult<TestContext> {
    let entries = full_range_rectangles(&mut StdRng::seed_from_u64(seed), 300);
    let tree = RTree::empty().add_entries(entries.clone());
    Ok(TestContext::new(seed, entries, tree))
}

pub fn point_entry(value: u64, x: i32, y: i32) -> Entry<u64, Point> {
    Entry::new(value, Point::new(x, y))
}

pub fn rect_entry(value: u64, x1: i32, y1: i32, x2: i32, y2: i32) -> Entry<u64, Rectangle> {
    Entry::new(value, Rectangle::new(x1, y1, x2, y2))
}

/// `count` rectangles inside `[0, extent)`, each side shorter than `max_side`.
pub fn random_rectangles(
    rng: &mut impl Rng,
    count: u64,
    extent: i32,
    max_side: i32,
) -> Vec<Entry<u64, Rectangle>> {
    (0..count)
        .map(|value| {
            let x = rng.random_range(0..extent);
            let y = rng.random_range(0..extent);
            let w = rng.random_range(0..max_side);
            let h = rng.random_range(0..max_side);
            rect_entry(value, x, y, x + w, y + h)
        })
        .collect()
}

/// `count` points inside `[0, extent)`.
pub fn random_points(rng: &mut impl Rng, count: u64, extent: i32) -> Vec<Entry<u64, Point>> {
    (0..count)
        .map(|value| point_entry(value, rng.random_range(0..extent), rng.random_range(0..extent)))
        .collect()
}

pub fn random_rectangle(rng: &mut impl Rng, extent: i32, max_side: i32) -> Rectangle {
    let x = rng.random_range(0..extent);
    let y = rng.random_range(0..extent);
    Rectangle::new(
        x,
        y,
        x + rng.random_range(0..max_side),
        y + rng.random_range(0..max_side),
    )
}

/// A rectangle with both corners anywhere on the `i32` grid.
pub fn full_range_rectangle(rng: &mut impl Rng) -> Rectangle {
    let (x1, x2) = ordered(rng.random(), rng.random());
    let (y1, y2) = ordered(rng.random(), rng.random());
    Rectangle::new(x1, y1, x2, y2)
}

/// `count` rectangles with corners anywhere on the `i32` grid, including the
/// extremes.
pub fn full_range_rectangles(rng: &mut impl Rng, count: u64) -> Vec<Entry<u64, Rectangle>> {
    let mut entries: Vec<_> = (0..count)
        .map(|value| Entry::new(value, full_range_rectangle(rng)))
        .collect();
    entries.push(rect_entry(count, i32::MIN, i32::MIN, i32::MIN, i32::MIN));
    entries.push(rect_entry(count + 1, i32::MAX, i32::MAX, i32::MAX, i32::MAX));
    entries.push(rect_entry(count + 2, i32::MIN, i32::MAX, i32::MIN, i32::MAX));
    entries.push(rect_entry(count + 3, i32::MIN, i32::MIN, i32::MAX, i32::MAX));
    entries
}

fn ordered(a: i32, b: i32) -> (i32, i32) {
    (a.min(b), a.max(b))
}

/// Values of the entries, sorted.
pub fn sorted_values<'a, G: 'a>(entries: impl IntoIterator<Item = &'a Entry<u64, G>>) -> Vec<u64> {
    let mut values: Vec<u64> = entries.into_iter().map(|e| *e.value()).collect();
    values.sort_unstable();
    values
}

/// Counts equal entries, for multiset comparisons.
pub fn multiset<'a, V, G>(entries: impl IntoIterator<Item = &'a Entry<V, G>>) -> HashMap<&'a Entry<V, G>, usize>
where
    V: Eq + Hash + 'a,
    G: Eq + Hash + 'a,
{
    let mut counts = HashMap::new();
    for entry in entries {
        *counts.entry(entry).or_insert(0) += 1;
    }
    counts
}

/// Linear scan for entries intersecting `query`.
pub fn brute_force_intersecting<'a, V, G: Geometry>(
    entries: &'a [Entry<V, G>],
    query: &Rectangle,
) -> Vec<&'a Entry<V, G>> {
    entries
        .iter()
        .filter(|e| e.geometry().intersects(query))
        .collect()
}

/// Linear scan for distances of the entries strictly closer than `max_distance`.
pub fn brute_force_distances<V, G: Geometry>(
    entries: &[Entry<V, G>],
    query: &Rectangle,
    max_distance: f64,
) -> Vec<f64> {
    let mut distances: Vec<f64> = entries
        .iter()
        .map(|e| e.geometry().distance(query))
        .filter(|&d| d < max_distance)
        .collect();
    distances.sort_by(f64::total_cmp);
    distances
}

/// Depth of every leaf, counting the root as depth 1.
pub fn leaf_depths<V, G>(tree: &RTree<V, G>) -> Vec<usize> {
    fn walk<V, G>(node: &Node<V, G>, depth: usize, out: &mut Vec<usize>) {
        match node {
            Node::Leaf(_) => out.push(depth),
            Node::NonLeaf(non_leaf) => {
                for child in non_leaf.children() {
                    walk(child, depth + 1, out);
                }
            }
        }
    }

    let mut depths = Vec::new();
    if let Some(root) = tree.root() {
        walk(root, 1, &mut depths);
    }
    depths
}

/// Checks that every node's cached MBR is exactly the union of its items and
/// that no node holds more than `max_children` items.
pub fn assert_node_invariants<V, G: Geometry>(tree: &RTree<V, G>) {
    fn walk<V, G: Geometry>(node: &Node<V, G>, max_children: usize) {
        assert!(
            node.count() <= max_children,
            "node holds {} items, max is {}",
            node.count(),
            max_children
        );
        let union = match node {
            Node::Leaf(leaf) => leaf
                .entries()
                .iter()
                .fold(Rectangle::empty(), |acc, e| acc.add(&e.geometry().mbr())),
            Node::NonLeaf(non_leaf) => {
                for child in non_leaf.children() {
                    walk(child, max_children);
                }
                non_leaf
                    .children()
                    .iter()
                    .fold(Rectangle::empty(), |acc, c| acc.add(&c.mbr()))
            }
        };
        assert_eq!(node.mbr(), union, "cached MBR differs from the union of its items");
    }

    if let Some(root) = tree.root() {
        walk(root, tree.context().max_children());
    }
}
