//! Lazy depth-first traversal behind the search operations.

use std::iter::FusedIterator;

use crate::entry::Entry;
use crate::geometry::Geometry;
use crate::node::Node;

/// Lazy, depth-first iterator over the entries matching a condition.
///
/// The condition is evaluated against node MBRs to prune subtrees and
/// against entry geometries to select results, so it must be monotonic: if
/// it holds for a geometry it must hold for every rectangle containing that
/// geometry. Entries are yielded in tree order.
///
/// Returned by [`RTree::search`](crate::RTree::search) and friends.
pub struct Search<'a, V, G, F> {
    condition: F,
    stack: Vec<NodePosition<'a, V, G>>,
}

struct NodePosition<'a, V, G> {
    node: &'a Node<V, G>,
    position: usize,
}

impl<'a, V, G, F> Search<'a, V, G, F>
where
    G: Geometry,
    F: Fn(&dyn Geometry) -> bool,
{
    pub(crate) fn new(root: Option<&'a Node<V, G>>, condition: F) -> Self {
        let stack = root
            .map(|node| vec![NodePosition { node, position: 0 }])
            .unwrap_or_default();
        Search { condition, stack }
    }

    fn search(&mut self) -> Option<&'a Entry<V, G>> {
        while let Some(top) = self.stack.last_mut() {
            match top.node {
                Node::NonLeaf(non_leaf) => match non_leaf.children().get(top.position) {
                    Some(child) => {
                        let mbr = child.mbr();
                        if (self.condition)(&mbr as &dyn Geometry) {
                            self.stack.push(NodePosition {
                                node: child,
                                position: 0,
                            });
                        } else {
                            top.position += 1;
                        }
                    }
                    None => self.pop(),
                },
                Node::Leaf(leaf) => {
                    let entries = leaf.entries();
                    while top.position < entries.len() {
                        let entry = &entries[top.position];
                        top.position += 1;
                        if (self.condition)(entry.geometry() as &dyn Geometry) {
                            return Some(entry);
                        }
                    }
                    self.pop();
                }
            }
        }
        None
    }

    // drops an exhausted frame and moves its parent past it
    fn pop(&mut self) {
        self.stack.pop();
        if let Some(parent) = self.stack.last_mut() {
            parent.position += 1;
        }
    }
}

impl<'a, V, G, F> Iterator for Search<'a, V, G, F>
where
    G: Geometry,
    F: Fn(&dyn Geometry) -> bool,
{
    type Item = &'a Entry<V, G>;

    fn next(&mut self) -> Option<Self::Item> {
        self.search()
    }
}

impl<'a, V, G, F> FusedIterator for Search<'a, V, G, F>
where
    G: Geometry,
    F: Fn(&dyn Geometry) -> bool,
{
}
