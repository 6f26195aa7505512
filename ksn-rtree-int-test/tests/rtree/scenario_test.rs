//! End-to-end scenarios on small hand-built trees and one large bulk load.

use ksn_rtree::{Entry, Geometry, Point, RTree, Rectangle};
use ksn_rtree_int_test::test_util::{point_entry, random_points, rect_entry, sorted_values};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_single_point_is_found() {
    let tree = RTree::empty().add(point_entry(1, 1, 1));

    let found: Vec<_> = tree.search_intersecting(&Point::new(1, 1)).collect();
    assert_eq!(found, vec![&point_entry(1, 1, 1)]);
    assert!(tree.search_intersecting(&Point::new(1, 2)).next().is_none());
}

#[test]
fn test_rectangle_intersections() {
    let a = rect_entry(1, 0, 0, 1, 1);
    let b = rect_entry(2, 2, 2, 3, 3);
    let c = rect_entry(3, 0, 0, 5, 5);
    let tree = RTree::empty().add(a).add(b).add(c);

    assert_eq!(
        sorted_values(tree.search_intersecting(&Rectangle::new(1, 1, 1, 1))),
        vec![1, 3]
    );
    assert_eq!(
        sorted_values(tree.search_intersecting(&Rectangle::new(4, 4, 7, 7))),
        vec![3]
    );
    assert_eq!(
        sorted_values(tree.search_intersecting(&Rectangle::new(0, 0, 5, 5))),
        vec![1, 2, 3]
    );
}

#[test]
fn test_nearest_on_diagonal() {
    let tree = RTree::empty().add_entries((0..=10).map(|i| point_entry(i as u64, i, i)));

    let nearest = tree.nearest(&Point::new(3, 3), 10.0, 3);
    assert_eq!(nearest.len(), 3);
    assert_eq!(sorted_values(nearest.iter().copied()), vec![2, 3, 4]);

    // (2,2) and (4,4) are sqrt(2) away, (1,1) and (5,5) are 2*sqrt(2) away
    let within_two = tree.nearest(&Point::new(3, 3), 2.0, 10);
    assert_eq!(within_two.len(), 3);
    assert_eq!(*within_two[0].value(), 3);
    assert_eq!(sorted_values(within_two.iter().copied()), vec![2, 3, 4]);
}

#[test]
fn test_search_within_distance() {
    let tree = RTree::empty().add(point_entry(1, 1, 1));

    let near: Vec<_> = tree.search_within_distance(&Point::new(10, 10), 100.0).collect();
    assert_eq!(near, vec![&point_entry(1, 1, 1)]);

    // the actual distance is about 12.73
    assert_eq!(tree.search_within_distance(&Point::new(10, 10), 10.0).count(), 0);
}

#[test]
fn test_nearest_after_bulk_load_of_100001_points() {
    let mut rng = StdRng::seed_from_u64(100_001);
    let entries = random_points(&mut rng, 100_001, 1_000);
    let tree = RTree::create(entries);
    assert_eq!(tree.size(), 100_001);

    let query = Point::new(100, 100);
    let nearest = tree.nearest(&query, 100.0, 30);
    assert!(nearest.len() <= 30);
    assert!(!nearest.is_empty());

    let query_mbr = Rectangle::from(query);
    let distances: Vec<f64> = nearest
        .iter()
        .map(|e| e.geometry().distance(&query_mbr))
        .collect();
    assert!(distances.iter().all(|&d| d < 100.0));
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_mixed_geometries_through_rectangles() {
    let tree: RTree<&str, Rectangle> = RTree::create(vec![
        Entry::new("anchor", Point::new(10, 10).into()),
        Entry::new("box", Rectangle::new(0, 0, 4, 4)),
        Entry::new("wide", Rectangle::new(-50, 20, 50, 21)),
    ]);

    let hits: Vec<&str> = tree
        .search_intersecting(&Rectangle::new(3, 3, 10, 20))
        .map(|e| *e.value())
        .collect();
    assert_eq!(hits.len(), 3);

    let nearest = tree.nearest(&Point::new(9, 9), 5.0, 1);
    assert_eq!(*nearest[0].value(), "anchor");
}

#[test]
fn test_entries_and_mbr_of_empty_tree() {
    let tree = RTree::<u64, Point>::empty();
    assert!(tree.is_empty());
    assert_eq!(tree.mbr(), None);
    assert_eq!(tree.entries().count(), 0);
    assert_eq!(tree.search_intersecting(&Point::new(0, 0)).count(), 0);
    assert!(tree.nearest(&Point::new(0, 0), f64::MAX, 10).is_empty());
    assert_eq!(tree.calculate_depth(), 0);
}
