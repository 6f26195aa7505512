//! Choosing which child receives a new entry.

use std::fmt::Debug;
use std::sync::Arc;

use crate::geometry::Rectangle;
use crate::node::Node;

/// Chooses the child of a non-leaf node that receives a new entry.
///
/// `nodes` is never empty. The returned index must be a valid position in
/// `nodes`; debug builds assert it and release builds clamp it to the last
/// child.
pub trait Selector<V, G>: Send + Sync + Debug {
    fn select(&self, mbr: &Rectangle, nodes: &[Arc<Node<V, G>>]) -> usize;
}

/// Picks the child whose MBR grows the least when extended by the new entry.
///
/// Ties go to the child with the smaller area, then to the earliest child.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinimalAreaIncreaseSelector;

impl<V, G> Selector<V, G> for MinimalAreaIncreaseSelector {
    fn select(&self, mbr: &Rectangle, nodes: &[Arc<Node<V, G>>]) -> usize {
        let mut best = 0;
        let mut best_key = (i128::MAX, i128::MAX);
        for (index, node) in nodes.iter().enumerate() {
            let area = node.mbr().area();
            let key = (node.mbr().add(mbr).area() - area, area);
            if key < best_key {
                best_key = key;
                best = index;
            }
        }
        best
    }
}
