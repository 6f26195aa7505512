use ksn_rtree::{Point, RTree, SpatialResult};
use ksn_rtree_int_test::test_util::{point_entry, random_points};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> SpatialResult<()> {
    colog::init();
    println!("Starting stress test...");

    let count = 100_001;
    let mut rng = StdRng::seed_from_u64(42);
    let entries = random_points(&mut rng, count, 1_000);

    let start = std::time::Instant::now();
    let tree = RTree::builder().create(entries.clone())?;
    let elapsed = start.elapsed();
    println!(
        "Bulk loaded {} points in {:?} (depth {})",
        tree.size(),
        elapsed,
        tree.calculate_depth()
    );

    let start = std::time::Instant::now();
    let nearest = tree.nearest(&Point::new(100, 100), 100.0, 30);
    let elapsed = start.elapsed();
    println!("Found {} nearest points in {:?}", nearest.len(), elapsed);

    let start = std::time::Instant::now();
    let incremental = RTree::empty().add_entries(entries.iter().take(20_000).cloned());
    let elapsed = start.elapsed();
    println!("Added {} points one by one in {:?}", incremental.size(), elapsed);

    let start = std::time::Instant::now();
    let pruned = tree.delete_entries(entries.iter().step_by(10), false);
    let elapsed = start.elapsed();
    println!("Deleted {} points in {:?}", tree.size() - pruned.size(), elapsed);

    let start = std::time::Instant::now();
    let extra = (0..10_000).map(|i| point_entry(count + i, (i % 100) as i32, (i / 100) as i32));
    let grown = pruned.add_entries(extra);
    let found = grown.search_within_distance(&Point::new(50, 50), 25.0).count();
    println!(
        "Grew tree to {} points, {} within 25 of (50, 50), in {:?}",
        grown.size(),
        found,
        start.elapsed()
    );

    Ok(())
}
