//! Validated configuration for new trees, including Sort-Tile-Recursive
//! bulk loading through [`RTreeBuilder::create`].

use std::sync::Arc;

use itertools::Itertools;
use log::{debug, error};

use crate::context::{default_min_children, Context, DEFAULT_MAX_CHILDREN};
use crate::entry::Entry;
use crate::errors::{SpatialError, SpatialResult};
use crate::factory::{DefaultFactory, Factory};
use crate::geometry::{Geometry, HasGeometry};
use crate::node::Node;
use crate::rtree::RTree;
use crate::selector::{MinimalAreaIncreaseSelector, Selector};
use crate::splitter::{QuadraticSplitter, Splitter};

/// Default share of `max_children` that bulk loading packs into each node.
pub const DEFAULT_LOADING_FACTOR: f64 = 0.7;

/// Configures and creates an [`RTree`].
///
/// Every setting has a default: `max_children = 4`, `min_children =
/// round(0.4 * max_children)`, quadratic splitting, minimal-area-increase
/// selection, plain nodes and a loading factor of 0.7. The configuration is
/// validated when the tree is created.
///
/// # Examples
///
/// ```rust
/// use ksn_rtree::{Entry, Point, RTree};
///
/// let tree = RTree::builder()
///     .max_children(8)
///     .min_children(3)
///     .loading_factor(1.0)
///     .create((0..100).map(|i| Entry::new(i, Point::new(i % 10, i / 10))))
///     .expect("valid configuration");
///
/// assert_eq!(tree.size(), 100);
/// assert_eq!(tree.context().max_children(), 8);
/// ```
pub struct RTreeBuilder<V, G> {
    max_children: Option<usize>,
    min_children: Option<usize>,
    selector: Arc<dyn Selector<V, G>>,
    splitter: Arc<dyn Splitter>,
    factory: Arc<dyn Factory<V, G>>,
    loading_factor: f64,
}

impl<V, G: Geometry> RTreeBuilder<V, G> {
    pub fn new() -> Self {
        RTreeBuilder {
            max_children: None,
            min_children: None,
            selector: Arc::new(MinimalAreaIncreaseSelector),
            splitter: Arc::new(QuadraticSplitter),
            factory: Arc::new(DefaultFactory),
            loading_factor: DEFAULT_LOADING_FACTOR,
        }
    }
}

impl<V, G: Geometry> Default for RTreeBuilder<V, G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, G> RTreeBuilder<V, G> {
    /// Maximum number of items per node; must be greater than 2.
    pub fn max_children(mut self, max_children: usize) -> Self {
        self.max_children = Some(max_children);
        self
    }

    /// Minimum number of items per non-root node; must be at least 1 and
    /// below `max_children`. Defaults to `round(0.4 * max_children)`.
    pub fn min_children(mut self, min_children: usize) -> Self {
        self.min_children = Some(min_children);
        self
    }

    pub fn selector(mut self, selector: impl Selector<V, G> + 'static) -> Self {
        self.selector = Arc::new(selector);
        self
    }

    pub fn splitter(mut self, splitter: impl Splitter + 'static) -> Self {
        self.splitter = Arc::new(splitter);
        self
    }

    pub fn factory(mut self, factory: impl Factory<V, G> + 'static) -> Self {
        self.factory = Arc::new(factory);
        self
    }

    /// Share of `max_children` filled per node by bulk loading, in `(0, 1]`.
    pub fn loading_factor(mut self, loading_factor: f64) -> Self {
        self.loading_factor = loading_factor;
        self
    }

    fn context(&self) -> SpatialResult<Context<V, G>> {
        let max_children = self.max_children.unwrap_or(DEFAULT_MAX_CHILDREN);
        let min_children = self
            .min_children
            .unwrap_or_else(|| default_min_children(max_children));
        Context::new(
            min_children,
            max_children,
            Arc::clone(&self.selector),
            Arc::clone(&self.splitter),
            Arc::clone(&self.factory),
        )
    }

    /// Number of items bulk loading packs into each node.
    fn capacity(&self, max_children: usize) -> SpatialResult<usize> {
        let factor = self.loading_factor;
        if !(factor > 0.0 && factor <= 1.0) {
            error!("Loading factor must be in (0, 1], got {}", factor);
            return Err(SpatialError::InvalidLoadingFactor {
                factor,
                reason: "must be in (0, 1]".to_string(),
            });
        }

        let capacity = loading_capacity(max_children, factor);
        if capacity < 2 {
            error!(
                "Loading factor {} packs {} item(s) per node with max_children {}",
                factor, capacity, max_children
            );
            return Err(SpatialError::InvalidLoadingFactor {
                factor,
                reason: format!(
                    "packs {} item(s) per node with max_children {}, at least 2 are needed",
                    capacity, max_children
                ),
            });
        }
        Ok(capacity)
    }
}

impl<V, G: Geometry> RTreeBuilder<V, G> {
    /// Creates an empty tree with this configuration.
    pub fn build(self) -> SpatialResult<RTree<V, G>> {
        let context = self.context()?;
        self.capacity(context.max_children())?;
        Ok(RTree::from_parts(None, 0, Arc::new(context)))
    }

    /// Bulk loads `entries` into a tree with this configuration using the
    /// Sort-Tile-Recursive algorithm.
    pub fn create<I>(self, entries: I) -> SpatialResult<RTree<V, G>>
    where
        I: IntoIterator<Item = Entry<V, G>>,
    {
        let context = self.context()?;
        let capacity = self.capacity(context.max_children())?;
        Ok(bulk_load(
            Arc::new(context),
            capacity,
            entries.into_iter().collect(),
        ))
    }
}

/// `round(max_children * loading_factor)`.
pub(crate) fn loading_capacity(max_children: usize, loading_factor: f64) -> usize {
    (max_children as f64 * loading_factor).round() as usize
}

// one level of the tree under construction, bottom-up
enum Level<V, G> {
    Entries(Vec<Entry<V, G>>),
    Nodes(Vec<Arc<Node<V, G>>>),
}

impl<V, G> Level<V, G> {
    fn len(&self) -> usize {
        match self {
            Level::Entries(entries) => entries.len(),
            Level::Nodes(nodes) => nodes.len(),
        }
    }
}

/// Packs `entries` bottom-up with Sort-Tile-Recursive.
///
/// Each pass sorts the items by the x midpoint of their MBR, cuts them into
/// `ceil(sqrt(node_count))` vertical slices, sorts every slice by the y
/// midpoint and wraps runs of `capacity` items into nodes, until a single
/// node remains. `capacity` must be at least 2.
pub(crate) fn bulk_load<V, G: Geometry>(
    context: Arc<Context<V, G>>,
    capacity: usize,
    entries: Vec<Entry<V, G>>,
) -> RTree<V, G> {
    debug_assert!(capacity >= 2, "bulk loading needs a node capacity of at least 2");
    let size = entries.len();
    let factory = context.factory();
    let mut level = Level::Entries(entries);
    let mut depth = 0;

    loop {
        let node_count = level.len().div_ceil(capacity);
        if node_count == 0 {
            return RTree::from_parts(None, 0, context);
        }
        depth += 1;

        if node_count == 1 {
            let root = match level {
                Level::Entries(entries) => factory.create_leaf(entries),
                Level::Nodes(nodes) => factory.create_non_leaf(nodes),
            };
            debug!(
                "Bulk loaded {} entries into {} level(s) with node capacity {}",
                size, depth, capacity
            );
            return RTree::from_parts(Some(Arc::new(root)), size, context);
        }

        let slice_capacity = (node_count as f64).sqrt().ceil() as usize * capacity;
        level = Level::Nodes(match level {
            Level::Entries(entries) => tile(entries, slice_capacity, capacity, |group| {
                factory.create_leaf(group)
            }),
            Level::Nodes(nodes) => tile(nodes, slice_capacity, capacity, |group| {
                factory.create_non_leaf(group)
            }),
        });
    }
}

fn tile<T, V, G>(
    mut items: Vec<T>,
    slice_capacity: usize,
    capacity: usize,
    mut make_node: impl FnMut(Vec<T>) -> Node<V, G>,
) -> Vec<Arc<Node<V, G>>>
where
    T: HasGeometry,
{
    items.sort_by_key(|item| item.mbr().mid_x2());

    let mut nodes = Vec::with_capacity(items.len().div_ceil(capacity));
    for slice in &items.into_iter().chunks(slice_capacity) {
        let mut slice: Vec<T> = slice.collect();
        slice.sort_by_key(|item| item.mbr().mid_y2());
        for group in &slice.into_iter().chunks(capacity) {
            nodes.push(Arc::new(make_node(group.collect())));
        }
    }
    nodes
}
