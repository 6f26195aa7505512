//! The immutable [`RTree`] and its operations.
//!
//! Adding or deleting returns a new tree that shares unchanged subtrees with
//! the old one, so any published tree can be read concurrently.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Write};
use std::sync::Arc;

use log::debug;

use crate::bounded_queue::BoundedPriorityQueue;
use crate::builder::{bulk_load, loading_capacity, RTreeBuilder, DEFAULT_LOADING_FACTOR};
use crate::context::{Context, DEFAULT_MAX_CHILDREN};
use crate::entry::Entry;
use crate::geometry::{Geometry, Rectangle};
use crate::node::Node;
use crate::search::Search;

const MARGIN_INCREMENT: &str = "  ";

/// An immutable in-memory R-tree.
///
/// Every mutating operation returns a new tree and leaves `self` untouched.
/// Versions share every subtree a mutation did not touch, so `add` and
/// `delete` only allocate along one root-to-leaf path, and cloning a tree is
/// two reference-count increments.
///
/// A tree is `Send + Sync` whenever its values and geometries are, so a
/// published tree can be queried from any number of threads without locks.
/// Callers that want a "current" tree hold and swap their own reference.
///
/// # Examples
///
/// ```rust
/// use ksn_rtree::{Entry, Point, RTree, Rectangle};
///
/// let tree = RTree::empty()
///     .add(Entry::new("a", Rectangle::new(0, 0, 1, 1)))
///     .add(Entry::new("b", Rectangle::new(2, 2, 3, 3)))
///     .add(Entry::new("c", Point::new(9, 9).into()));
///
/// let hits: Vec<_> = tree
///     .search_intersecting(&Rectangle::new(1, 1, 2, 2))
///     .map(|entry| *entry.value())
///     .collect();
/// assert_eq!(hits, vec!["a", "b"]);
///
/// let nearest = tree.nearest(&Point::new(8, 8), 5.0, 1);
/// assert_eq!(*nearest[0].value(), "c");
/// ```
pub struct RTree<V, G> {
    root: Option<Arc<Node<V, G>>>,
    size: usize,
    context: Arc<Context<V, G>>,
}

impl<V, G> RTree<V, G> {
    pub(crate) fn from_parts(
        root: Option<Arc<Node<V, G>>>,
        size: usize,
        context: Arc<Context<V, G>>,
    ) -> Self {
        RTree {
            root,
            size,
            context,
        }
    }

    /// Returns a builder to configure a tree before creating it.
    pub fn builder() -> RTreeBuilder<V, G>
    where
        G: Geometry,
    {
        RTreeBuilder::new()
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of entries in the tree.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn context(&self) -> &Context<V, G> {
        &self.context
    }

    /// The root node, `None` for an empty tree.
    pub fn root(&self) -> Option<&Node<V, G>> {
        self.root.as_deref()
    }

    /// The minimum bounding rectangle of all entries, `None` for an empty tree.
    pub fn mbr(&self) -> Option<Rectangle> {
        self.root.as_ref().map(|root| root.mbr())
    }

    /// Number of levels, following the first child down to a leaf.
    ///
    /// An empty tree has depth 0 and a tree whose root is a leaf has depth 1.
    pub fn calculate_depth(&self) -> usize {
        let mut depth = 0;
        let mut node = self.root.as_deref();
        while let Some(current) = node {
            depth += 1;
            node = match current {
                Node::Leaf(_) => None,
                Node::NonLeaf(non_leaf) => non_leaf.children().first().map(Arc::as_ref),
            };
        }
        depth
    }
}

impl<V, G: Geometry> RTree<V, G> {
    /// An empty tree with the default configuration.
    pub fn empty() -> Self {
        RTree::from_parts(None, 0, Arc::new(Context::with_defaults()))
    }

    /// Bulk loads `entries` with the Sort-Tile-Recursive algorithm using the
    /// default configuration.
    ///
    /// Use [`RTree::builder`] to change the fan-out, the strategies or the
    /// loading factor.
    pub fn create<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = Entry<V, G>>,
    {
        bulk_load(
            Arc::new(Context::with_defaults()),
            loading_capacity(DEFAULT_MAX_CHILDREN, DEFAULT_LOADING_FACTOR),
            entries.into_iter().collect(),
        )
    }

    /// Lazily yields the entries whose geometry satisfies `condition`.
    ///
    /// The condition also decides which subtrees are visited, by being tested
    /// against their MBRs, so it must be monotonic: whenever it holds for a
    /// geometry it must hold for every rectangle containing that geometry.
    pub fn search<F>(&self, condition: F) -> Search<'_, V, G, F>
    where
        F: Fn(&dyn Geometry) -> bool,
    {
        Search::new(self.root.as_deref(), condition)
    }

    /// Entries whose geometry intersects the MBR of `query`.
    pub fn search_intersecting(
        &self,
        query: &dyn Geometry,
    ) -> Search<'_, V, G, impl Fn(&dyn Geometry) -> bool> {
        let mbr = query.mbr();
        self.search(move |geometry: &dyn Geometry| geometry.intersects(&mbr))
    }

    /// Entries whose geometry is strictly closer than `max_distance` to the
    /// MBR of `query`.
    pub fn search_within_distance(
        &self,
        query: &dyn Geometry,
        max_distance: f64,
    ) -> Search<'_, V, G, impl Fn(&dyn Geometry) -> bool> {
        let mbr = query.mbr();
        self.search(move |geometry: &dyn Geometry| geometry.distance(&mbr) < max_distance)
    }

    /// Entries intersecting the MBR of `query` that also pass the exact
    /// `predicate`.
    ///
    /// The MBR search narrows the candidates and `predicate` decides, which is
    /// how shapes that do not fill their bounding rectangle are queried.
    pub fn search_refined<'a, Q, P>(
        &'a self,
        query: &'a Q,
        predicate: P,
    ) -> impl Iterator<Item = &'a Entry<V, G>> + 'a
    where
        Q: Geometry,
        P: Fn(&G, &Q) -> bool + 'a,
    {
        self.search_intersecting(query)
            .filter(move |entry| predicate(entry.geometry(), query))
    }

    /// The `max_count` entries nearest to `query` that lie strictly closer
    /// than `max_distance`, in ascending order of distance.
    pub fn nearest(
        &self,
        query: &dyn Geometry,
        max_distance: f64,
        max_count: usize,
    ) -> Vec<&Entry<V, G>> {
        let mbr = query.mbr();
        let mut queue = BoundedPriorityQueue::new(max_count, by_distance::<&Entry<V, G>>);
        for entry in self.search_within_distance(query, max_distance) {
            queue.add((entry.geometry().distance(&mbr), entry));
        }
        queue
            .into_ordered_vec()
            .into_iter()
            .map(|(_, entry)| entry)
            .collect()
    }

    /// Every entry of the tree, in tree order.
    pub fn entries(&self) -> Search<'_, V, G, impl Fn(&dyn Geometry) -> bool> {
        self.search(|_: &dyn Geometry| true)
    }
}

fn by_distance<T>(a: &(f64, T), b: &(f64, T)) -> Ordering {
    a.0.total_cmp(&b.0)
}

impl<V, G> RTree<V, G>
where
    V: Clone + PartialEq,
    G: Geometry + Clone + PartialEq,
{
    /// Returns a new tree that also holds `entry`.
    pub fn add(&self, entry: Entry<V, G>) -> Self {
        let factory = self.context.factory();
        let root = match &self.root {
            None => Arc::new(factory.create_leaf(vec![entry])),
            Some(root) => {
                let mut nodes = root.add(entry, &self.context);
                if nodes.len() == 1 {
                    nodes.remove(0)
                } else {
                    Arc::new(factory.create_non_leaf(nodes.into_vec()))
                }
            }
        };
        RTree::from_parts(Some(root), self.size + 1, Arc::clone(&self.context))
    }

    /// Returns a new tree that also holds every entry of `entries`, added one
    /// at a time.
    pub fn add_entries<I>(&self, entries: I) -> Self
    where
        I: IntoIterator<Item = Entry<V, G>>,
    {
        entries
            .into_iter()
            .fold(self.clone(), |tree, entry| tree.add(entry))
    }

    /// Returns a new tree without `entry`.
    ///
    /// Removes one matching entry, or every matching entry when `all` is set.
    /// Entries match when both value and geometry are equal. If nothing
    /// matches the result shares its root with `self`.
    ///
    /// Nodes that fall below `min_children` are dissolved and their remaining
    /// entries are added again from the root.
    pub fn delete(&self, entry: &Entry<V, G>, all: bool) -> Self {
        let Some(root) = &self.root else {
            return self.clone();
        };

        let result = root.delete(entry, all, &self.context);
        if let Some(node) = &result.node {
            if Arc::ptr_eq(node, root) {
                return self.clone();
            }
        }

        let orphans = result.entries.len();
        if orphans > 0 {
            debug!("Re-adding {} orphaned entries after delete", orphans);
        }
        let pruned = RTree::from_parts(
            result.node,
            self.size - result.count_deleted - orphans,
            Arc::clone(&self.context),
        );
        pruned.add_entries(result.entries)
    }

    /// Deletes every entry of `entries` in turn.
    pub fn delete_entries<I>(&self, entries: I, all: bool) -> Self
    where
        I: IntoIterator,
        I::Item: Borrow<Entry<V, G>>,
    {
        entries
            .into_iter()
            .fold(self.clone(), |tree, entry| tree.delete(entry.borrow(), all))
    }
}

impl<V: Debug, G: Display> RTree<V, G> {
    /// A dump of the tree shape: one line per node (`mbr=...`) and entry
    /// (`entry=...`), indented two spaces per level. Empty for an empty tree.
    pub fn as_string(&self) -> String {
        self.to_string()
    }
}

fn write_node<V: Debug, G: Display>(
    out: &mut impl Write,
    node: &Node<V, G>,
    margin: &str,
) -> fmt::Result {
    writeln!(out, "{}mbr={}", margin, node.mbr())?;
    match node {
        Node::NonLeaf(non_leaf) => {
            let child_margin = format!("{}{}", margin, MARGIN_INCREMENT);
            for child in non_leaf.children() {
                write_node(out, Arc::as_ref(child), &child_margin)?;
            }
        }
        Node::Leaf(leaf) => {
            for entry in leaf.entries() {
                writeln!(out, "{}{}entry={}", margin, MARGIN_INCREMENT, entry)?;
            }
        }
    }
    Ok(())
}

impl<V: Debug, G: Display> Display for RTree<V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => write_node(f, Arc::as_ref(root), ""),
            None => Ok(()),
        }
    }
}

impl<V, G> Clone for RTree<V, G> {
    fn clone(&self) -> Self {
        RTree {
            root: self.root.clone(),
            size: self.size,
            context: Arc::clone(&self.context),
        }
    }
}

impl<V, G> Debug for RTree<V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RTree")
            .field("size", &self.size)
            .field("depth", &self.calculate_depth())
            .field("mbr", &self.mbr())
            .field("context", &self.context)
            .finish()
    }
}

impl<V, G: Geometry> FromIterator<Entry<V, G>> for RTree<V, G> {
    /// Bulk loads the entries, as [`RTree::create`] does.
    fn from_iter<I: IntoIterator<Item = Entry<V, G>>>(iter: I) -> Self {
        RTree::create(iter)
    }
}
