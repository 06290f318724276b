//! Spatial-subsystem error type.

use thiserror::Error;

/// Errors produced by `amod-spatial`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpatialError {
    #[error("nearest-neighbour query on an empty k-d tree")]
    EmptyTree,

    #[error("points must have at least one dimension")]
    ZeroDimensions,

    #[error("query has {got} dimensions, tree was built with {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}

pub type SpatialResult<T> = Result<T, SpatialError>;
