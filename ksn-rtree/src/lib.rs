//! # KSN R-Tree - Immutable Spatial Index
//!
//! This crate provides a generic, in-memory, two-dimensional R-tree that maps
//! rectangles and points on an integer grid to arbitrary values.
//!
//! ## Features
//!
//! - **Immutable**: every `add`/`delete` returns a new tree; old versions stay valid
//! - **Structural Sharing**: versions share untouched subtrees through `Arc`
//! - **Bulk Loading**: Sort-Tile-Recursive packing for large entry sets
//! - **Lazy Search**: stack-based iterator pruned by a caller-supplied condition
//! - **Nearest Neighbours**: distance-bounded k-NN queries
//! - **Pluggable Strategies**: custom `Selector`, `Splitter` and node `Factory`
//! - **Thread Safe Reads**: a published tree is `Send + Sync` and never mutated
//!
//! ## Quick Start
//!
//! ```rust
//! use ksn_rtree::{Entry, Point, RTree, Rectangle};
//!
//! // Bulk load a few shapes
//! let tree = RTree::create(vec![
//!     Entry::new(1, Rectangle::new(0, 0, 1, 1)),
//!     Entry::new(2, Rectangle::new(2, 2, 3, 3)),
//!     Entry::new(3, Rectangle::new(0, 0, 5, 5)),
//! ]);
//!
//! // Find the shapes under a point
//! let mut hits: Vec<i32> = tree
//!     .search_intersecting(&Point::new(1, 1))
//!     .map(|entry| *entry.value())
//!     .collect();
//! hits.sort();
//! assert_eq!(hits, vec![1, 3]);
//!
//! // Mutations return new trees
//! let smaller = tree.delete(&Entry::new(3, Rectangle::new(0, 0, 5, 5)), false);
//! assert_eq!(smaller.size(), 2);
//! assert_eq!(tree.size(), 3);
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use ksn_rtree::{Entry, Point, RTree, SpatialError};
//!
//! let tree = RTree::<u64, Point>::builder()
//!     .max_children(16)
//!     .min_children(6)
//!     .build()
//!     .expect("valid configuration")
//!     .add(Entry::new(7, Point::new(3, 4)));
//! assert_eq!(tree.calculate_depth(), 1);
//!
//! let err = RTree::<u64, Point>::builder().max_children(2).build().unwrap_err();
//! assert_eq!(err, SpatialError::MaxChildrenTooSmall(2));
//! ```

pub mod bounded_queue;
pub mod builder;
pub mod context;
pub mod entry;
pub mod errors;
pub mod factory;
pub mod geometry;
pub mod node;
pub mod rtree;
pub mod search;
pub mod selector;
pub mod splitter;

// Re-export core types
pub use entry::Entry;
pub use errors::{SpatialError, SpatialResult};
pub use geometry::{mbr_of, Geometry, HasGeometry, Point, Rectangle};
pub use rtree::RTree;
pub use search::Search;

// Re-export configuration
pub use builder::{RTreeBuilder, DEFAULT_LOADING_FACTOR};
pub use context::{Context, DEFAULT_FILLING_FACTOR, DEFAULT_MAX_CHILDREN};

// Re-export pluggable strategies
pub use factory::{DefaultFactory, Factory};
pub use node::{Leaf, Node, NonLeaf};
pub use selector::{MinimalAreaIncreaseSelector, Selector};
pub use splitter::{ListPair, QuadraticSplitter, Splitter};

pub use bounded_queue::BoundedPriorityQueue;
