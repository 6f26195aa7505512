//! Node construction hooks.

use std::fmt::Debug;
use std::sync::Arc;

use crate::entry::Entry;
use crate::geometry::Geometry;
use crate::node::{Leaf, Node, NonLeaf};

/// Creates the nodes of a tree.
///
/// Every node a tree builds goes through its factory, which makes the factory
/// the place to hook node construction (for example to count allocations).
pub trait Factory<V, G>: Send + Sync + Debug {
    fn create_leaf(&self, entries: Vec<Entry<V, G>>) -> Node<V, G>;

    fn create_non_leaf(&self, children: Vec<Arc<Node<V, G>>>) -> Node<V, G>;
}

/// Builds plain [`Leaf`] and [`NonLeaf`] nodes.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFactory;

impl<V, G: Geometry> Factory<V, G> for DefaultFactory {
    fn create_leaf(&self, entries: Vec<Entry<V, G>>) -> Node<V, G> {
        Node::Leaf(Leaf::new(entries))
    }

    fn create_non_leaf(&self, children: Vec<Arc<Node<V, G>>>) -> Node<V, G> {
        Node::NonLeaf(NonLeaf::new(children))
    }
}
