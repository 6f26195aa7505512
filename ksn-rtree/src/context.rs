//! Shared settings every node operation of a tree reads.

use std::fmt::{self, Debug};
use std::sync::Arc;

use log::error;

use crate::errors::{SpatialError, SpatialResult};
use crate::factory::{DefaultFactory, Factory};
use crate::geometry::Geometry;
use crate::selector::{MinimalAreaIncreaseSelector, Selector};
use crate::splitter::{QuadraticSplitter, Splitter};

/// Default maximum number of items per node.
pub const DEFAULT_MAX_CHILDREN: usize = 4;

/// Default ratio of `min_children` to `max_children`.
pub const DEFAULT_FILLING_FACTOR: f64 = 0.4;

/// The immutable configuration shared by every version of a tree.
///
/// A context fixes the node fan-out bounds and the strategies used to grow
/// the tree. It is validated once, at construction, and never changes.
pub struct Context<V, G> {
    min_children: usize,
    max_children: usize,
    selector: Arc<dyn Selector<V, G>>,
    splitter: Arc<dyn Splitter>,
    factory: Arc<dyn Factory<V, G>>,
}

impl<V, G> Context<V, G> {
    /// Creates a validated context.
    ///
    /// Fails when `min_children < 1`, `max_children <= 2` or
    /// `min_children >= max_children`.
    pub fn new(
        min_children: usize,
        max_children: usize,
        selector: Arc<dyn Selector<V, G>>,
        splitter: Arc<dyn Splitter>,
        factory: Arc<dyn Factory<V, G>>,
    ) -> SpatialResult<Self> {
        validate_children(min_children, max_children)?;
        Ok(Context {
            min_children,
            max_children,
            selector,
            splitter,
            factory,
        })
    }

    pub fn min_children(&self) -> usize {
        self.min_children
    }

    pub fn max_children(&self) -> usize {
        self.max_children
    }

    pub fn selector(&self) -> &dyn Selector<V, G> {
        self.selector.as_ref()
    }

    pub fn splitter(&self) -> &dyn Splitter {
        self.splitter.as_ref()
    }

    pub fn factory(&self) -> &dyn Factory<V, G> {
        self.factory.as_ref()
    }
}

impl<V, G: Geometry> Context<V, G> {
    /// The default context: `max_children = 4`, `min_children = 2`, quadratic
    /// splitting and minimal-area-increase selection.
    pub fn with_defaults() -> Self {
        Context {
            min_children: default_min_children(DEFAULT_MAX_CHILDREN),
            max_children: DEFAULT_MAX_CHILDREN,
            selector: Arc::new(MinimalAreaIncreaseSelector),
            splitter: Arc::new(QuadraticSplitter),
            factory: Arc::new(DefaultFactory),
        }
    }
}

/// `round(DEFAULT_FILLING_FACTOR * max_children)`.
pub(crate) fn default_min_children(max_children: usize) -> usize {
    (DEFAULT_FILLING_FACTOR * max_children as f64).round() as usize
}

pub(crate) fn validate_children(min_children: usize, max_children: usize) -> SpatialResult<()> {
    if max_children <= 2 {
        error!("max_children must be greater than 2, got {}", max_children);
        return Err(SpatialError::MaxChildrenTooSmall(max_children));
    }
    if min_children < 1 {
        error!("min_children must be at least 1, got {}", min_children);
        return Err(SpatialError::MinChildrenTooSmall(min_children));
    }
    if min_children >= max_children {
        error!(
            "min_children ({}) must be less than max_children ({})",
            min_children, max_children
        );
        return Err(SpatialError::MinChildrenNotBelowMax {
            min: min_children,
            max: max_children,
        });
    }
    Ok(())
}

impl<V, G> Clone for Context<V, G> {
    fn clone(&self) -> Self {
        Context {
            min_children: self.min_children,
            max_children: self.max_children,
            selector: Arc::clone(&self.selector),
            splitter: Arc::clone(&self.splitter),
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<V, G> Debug for Context<V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("min_children", &self.min_children)
            .field("max_children", &self.max_children)
            .field("selector", &self.selector)
            .field("splitter", &self.splitter)
            .field("factory", &self.factory)
            .finish()
    }
}
