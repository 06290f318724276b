use amod_core::ReturnCode;
use amod_demand::DemandError;
use amod_schedule::ScheduleError;
use amod_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FleetError {
    /// The simulator rejected a move the manager had already committed to,
    /// e.g. a rebalancing dispatch for a flow the LP judged feasible.
    #[error("{task} for entity {entity} failed: {code}")]
    Invariant {
        task:   &'static str,
        entity: u64,
        code:   ReturnCode,
    },

    #[error("invalid fleet configuration: {0}")]
    Config(String),

    #[error("bookings: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("demand estimator: {0}")]
    Demand(#[from] DemandError),

    #[error("location index error: {0}")]
    Spatial(#[from] SpatialError),
}

impl From<&FleetError> for ReturnCode {
    fn from(e: &FleetError) -> ReturnCode {
        match e {
            FleetError::Invariant { code, .. } => *code,
            FleetError::Schedule(s)            => ReturnCode::from(s),
            FleetError::Demand(d)              => ReturnCode::from(d),
            _                                  => ReturnCode::Failed,
        }
    }
}

pub type FleetResult<T> = Result<T, FleetError>;
