//! Node splitting strategies.
//!
//! A [`Splitter`] partitions the items of an overflowing node into two groups.
//! It works on the items' MBRs only and answers with item indices, so one
//! strategy serves both leaves (entries) and non-leaves (child nodes).

use std::fmt::Debug;

use log::warn;

use crate::geometry::{mbr_of, HasGeometry, Rectangle};

/// Splits the items of an overflowing node across two new nodes.
///
/// Implementations must return every index of `mbrs` exactly once, and both
/// groups must hold at least `min(min_size, mbrs.len() / 2)` indices. The tree
/// does not re-validate the partition in release builds; debug builds assert
/// it.
pub trait Splitter: Send + Sync + Debug {
    /// Partitions the items described by `mbrs` into two groups of indices.
    fn split(&self, mbrs: &[Rectangle], min_size: usize) -> ListPair<usize>;
}

/// The two groups produced by a split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListPair<T> {
    group1: Vec<T>,
    group2: Vec<T>,
}

impl<T> ListPair<T> {
    pub fn new(group1: Vec<T>, group2: Vec<T>) -> Self {
        ListPair { group1, group2 }
    }

    pub fn group1(&self) -> &[T] {
        &self.group1
    }

    pub fn group2(&self) -> &[T] {
        &self.group2
    }

    pub fn into_groups(self) -> (Vec<T>, Vec<T>) {
        (self.group1, self.group2)
    }
}

impl<T: HasGeometry> ListPair<T> {
    /// Sum of the perimeters of the two group MBRs.
    pub fn margin_sum(&self) -> i64 {
        mbr_of(&self.group1).perimeter() + mbr_of(&self.group2).perimeter()
    }

    /// Sum of the areas of the two group MBRs.
    pub fn area_sum(&self) -> i128 {
        mbr_of(&self.group1).area() + mbr_of(&self.group2).area()
    }
}

/// Guttman's quadratic split.
///
/// Seeds the two groups with the pair of items whose union wastes the most
/// area, then hands out the remaining items one at a time to the group whose
/// MBR grows the least, while keeping both groups able to reach the minimum
/// size. Cost is quadratic in the node fan-out, which is fine for the default
/// `max_children` of 4 but gets expensive for fan-outs in the hundreds.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuadraticSplitter;

impl Splitter for QuadraticSplitter {
    fn split(&self, mbrs: &[Rectangle], min_size: usize) -> ListPair<usize> {
        let n = mbrs.len();
        if n < 2 {
            return ListPair::new((0..n).collect(), Vec::new());
        }
        let min_size = min_size.min(n / 2);

        let (seed1, seed2) = worst_combination(mbrs);
        let mut group1 = vec![seed1];
        let mut group2 = vec![seed2];
        let mut mbr1 = mbrs[seed1];
        let mut mbr2 = mbrs[seed2];
        let mut remaining: Vec<usize> = (0..n).filter(|&i| i != seed1 && i != seed2).collect();

        while !remaining.is_empty() {
            let (position1, area1) = best_candidate(&remaining, mbrs, &mbr1);
            let (position2, area2) = best_candidate(&remaining, mbrs, &mbr2);

            // a group that needs every remaining item to reach min_size gets the next one
            let to_group1 = if group1.len() + remaining.len() <= min_size {
                true
            } else if group2.len() + remaining.len() <= min_size {
                false
            } else {
                area1 <= area2
            };

            if to_group1 {
                let index = remaining.remove(position1);
                mbr1 = mbr1.add(&mbrs[index]);
                group1.push(index);
            } else {
                let index = remaining.remove(position2);
                mbr2 = mbr2.add(&mbrs[index]);
                group2.push(index);
            }
        }

        ListPair::new(group1, group2)
    }
}

/// The pair of distinct items whose union has the largest area.
fn worst_combination(mbrs: &[Rectangle]) -> (usize, usize) {
    let mut worst = (0, 1);
    let mut worst_area = mbrs[0].add(&mbrs[1]).area();
    for i in 0..mbrs.len() {
        for j in (i + 1)..mbrs.len() {
            let area = mbrs[i].add(&mbrs[j]).area();
            if area > worst_area {
                worst_area = area;
                worst = (i, j);
            }
        }
    }
    worst
}

/// Position in `remaining` of the item whose union with `group_mbr` is
/// smallest, together with that union's area.
fn best_candidate(
    remaining: &[usize],
    mbrs: &[Rectangle],
    group_mbr: &Rectangle,
) -> (usize, i128) {
    let mut best = (0, i128::MAX);
    for (position, &index) in remaining.iter().enumerate() {
        let area = group_mbr.add(&mbrs[index]).area();
        if area < best.1 {
            best = (position, area);
        }
    }
    best
}

/// Applies `splitter` to whole items instead of their MBRs.
pub(crate) fn split_items<T: HasGeometry>(
    splitter: &dyn Splitter,
    items: Vec<T>,
    min_size: usize,
) -> ListPair<T> {
    let mbrs: Vec<Rectangle> = items.iter().map(HasGeometry::mbr).collect();
    let partition = splitter.split(&mbrs, min_size);
    debug_assert_eq!(
        partition.group1.len() + partition.group2.len(),
        items.len(),
        "{:?} must return every item exactly once",
        splitter
    );
    debug_assert!(
        partition.group1.len() >= min_size.min(items.len() / 2)
            && partition.group2.len() >= min_size.min(items.len() / 2),
        "{:?} returned a group below the minimum size {}",
        splitter,
        min_size
    );

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut take = |indices: &[usize]| -> Vec<T> {
        indices
            .iter()
            .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
            .collect()
    };
    let group1 = take(&partition.group1);
    let mut group2 = take(&partition.group2);

    // never lose items to a partition that skipped some indices
    let leftovers: Vec<T> = slots.into_iter().flatten().collect();
    if !leftovers.is_empty() {
        warn!(
            "{:?} left {} item(s) unassigned, appending them to the second group",
            splitter,
            leftovers.len()
        );
        group2.extend(leftovers);
    }

    ListPair::new(group1, group2)
}
