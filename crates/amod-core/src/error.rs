//! Result codes and the base error type.
//!
//! Two layers of failure exist in the simulator:
//!
//! - [`ReturnCode`] is the closed set of outcomes reported across the
//!   manager/simulator boundary.  These are recoverable: a booking that
//!   cannot be serviced is discarded with an event and the tick continues.
//! - Per-crate `thiserror` enums (`AmodError` here, `MotionError`,
//!   `FleetError`, … downstream) carry structural failures that stop a run.

use thiserror::Error;

/// Closed set of operation outcomes.
///
/// Operations return `Result<(), ReturnCode>`; `Success` is never used as an
/// `Err` value and exists so a result can be reported as a single code (see
/// [`ReturnCode::of`]).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReturnCode {
    #[error("failed")]
    Failed,

    #[error("success")]
    Success,

    #[error("cannot get vehicle")]
    CannotGetVehicle,

    #[error("cannot get customer")]
    CannotGetCustomer,

    #[error("vehicle cannot be dispatched (already dispatched)")]
    VehicleCannotBeDispatched,

    #[error("vehicle does not have customer")]
    VehicleDoesNotHaveCustomer,

    #[error("customer is not free")]
    CustomerIsNotFree,

    #[error("source equals destination")]
    SourceEqualsDestination,

    #[error("no path to destination")]
    NoPathToDestination,

    #[error("invalid station id")]
    InvalidStationId,

    #[error("error reading bookings file")]
    ErrorReadingBookingsFile,

    #[error("error reading demand histogram file")]
    ErrorReadingDemandHistFile,

    #[error("simulator is not set")]
    SimulatorIsNullptr,
}

impl ReturnCode {
    #[inline]
    pub fn is_success(self) -> bool {
        self == ReturnCode::Success
    }

    /// Collapse a command result into a single code.
    pub fn of(result: &Result<(), ReturnCode>) -> ReturnCode {
        match result {
            Ok(())  => ReturnCode::Success,
            Err(rc) => *rc,
        }
    }
}

/// The base error type shared by configuration and parsing paths.
#[derive(Debug, Error)]
pub enum AmodError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Code(#[from] ReturnCode),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `amod-core`.
pub type AmodResult<T> = Result<T, AmodError>;
