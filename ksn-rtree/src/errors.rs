//! Error and result types of the spatial index.
//!
//! Only configuration can fail: querying absent data yields empty results and
//! deleting an absent entry returns the tree unchanged.

use thiserror::Error;

/// Errors that can occur while configuring a tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpatialError {
    #[error("min_children must be at least 1, got {0}")]
    MinChildrenTooSmall(usize),

    #[error("max_children must be greater than 2, got {0}")]
    MaxChildrenTooSmall(usize),

    #[error("min_children ({min}) must be less than max_children ({max})")]
    MinChildrenNotBelowMax { min: usize, max: usize },

    #[error("Invalid loading factor {factor}: {reason}")]
    InvalidLoadingFactor { factor: f64, reason: String },
}

/// Result type for spatial operations
pub type SpatialResult<T> = Result<T, SpatialError>;
