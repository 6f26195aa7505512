//! Intersection queries agree with `rstar` on the same data.

use ksn_rtree::{Entry, Rectangle};
use ksn_rtree_int_test::test_util::{
    create_incremental_test_context, create_test_context, random_rectangle, run_test,
    sorted_values,
};
use rstar::primitives::GeomWithData;
use rstar::AABB;

type Reference = rstar::RTree<GeomWithData<rstar::primitives::Rectangle<[i64; 2]>, u64>>;

fn corners(rect: &Rectangle) -> ([i64; 2], [i64; 2]) {
    (
        [rect.x1() as i64, rect.y1() as i64],
        [rect.x2() as i64, rect.y2() as i64],
    )
}

fn reference_tree(entries: &[Entry<u64, Rectangle>]) -> Reference {
    let items = entries
        .iter()
        .map(|entry| {
            let (lower, upper) = corners(entry.geometry());
            let rectangle = rstar::primitives::Rectangle::from_corners(lower, upper);
            GeomWithData::new(rectangle, *entry.value())
        })
        .collect();
    rstar::RTree::bulk_load(items)
}

fn reference_search(tree: &Reference, query: &Rectangle) -> Vec<u64> {
    let (lower, upper) = corners(query);
    let mut values: Vec<u64> = tree
        .locate_in_envelope_intersecting(&AABB::from_corners(lower, upper))
        .map(|item| item.data)
        .collect();
    values.sort_unstable();
    values
}

#[test]
fn test_bulk_loaded_tree_agrees_with_rstar() {
    run_test(create_test_context, |ctx| {
        let reference = reference_tree(ctx.entries());
        let mut rng = ctx.rng();
        for _ in 0..100 {
            let query = random_rectangle(&mut rng, 1_000, 250);
            assert_eq!(
                sorted_values(ctx.tree().search_intersecting(&query)),
                reference_search(&reference, &query),
                "query {}",
                query
            );
        }
        Ok(())
    });
}

#[test]
fn test_incremental_tree_agrees_with_rstar() {
    run_test(create_incremental_test_context, |ctx| {
        let reference = reference_tree(ctx.entries());
        let mut rng = ctx.rng();
        for _ in 0..100 {
            let query = random_rectangle(&mut rng, 1_000, 250);
            assert_eq!(
                sorted_values(ctx.tree().search_intersecting(&query)),
                reference_search(&reference, &query),
                "query {}",
                query
            );
        }
        Ok(())
    });
}

#[test]
fn test_touching_edges_count_as_intersecting() {
    let entries = vec![
        Entry::new(1, Rectangle::new(0, 0, 10, 10)),
        Entry::new(2, Rectangle::new(10, 10, 20, 20)),
        Entry::new(3, Rectangle::new(21, 21, 30, 30)),
    ];
    let tree = ksn_rtree::RTree::create(entries.clone());
    let reference = reference_tree(&entries);

    for query in [
        Rectangle::new(10, 10, 10, 10),
        Rectangle::new(20, 20, 21, 21),
        Rectangle::new(11, 0, 15, 9),
    ] {
        assert_eq!(
            sorted_values(tree.search_intersecting(&query)),
            reference_search(&reference, &query)
        );
    }
}
