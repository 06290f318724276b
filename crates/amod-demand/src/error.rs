//! Demand-estimation error type.

use amod_core::{LocationId, ReturnCode};
use amod_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemandError {
    #[error("bin width must be a positive divisor of 86400 s, got {0}")]
    InvalidBinWidth(f64),

    #[error("demand estimation needs at least one location")]
    NoLocations,

    #[error("histogram covers {got} stations but {expected} locations are loaded")]
    StationCountMismatch { expected: usize, got: usize },

    #[error("histogram bin width {got} s does not match the configured {expected} s")]
    BinWidthMismatch { expected: f64, got: f64 },

    #[error("histogram line {line}: location {id} is not loaded")]
    UnknownLocation { id: LocationId, line: u64 },

    #[error("histogram line {line}: location {id} appears twice")]
    DuplicateLocation { id: LocationId, line: u64 },

    #[error("histogram line {line}: expected {expected} bin values, got {got}")]
    BinCountMismatch { line: u64, expected: usize, got: usize },

    #[error("histogram line {line}: {reason}")]
    Parse { line: u64, reason: String },

    #[error("histogram read/write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("location index error: {0}")]
    Spatial(#[from] SpatialError),
}

impl From<&DemandError> for ReturnCode {
    fn from(_: &DemandError) -> ReturnCode {
        ReturnCode::ErrorReadingDemandHistFile
    }
}

pub type DemandResult<T> = Result<T, DemandError>;
