use amod_core::ReturnCode;
use amod_fleet::FleetError;
use amod_motion::MotionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("simulator: {0}")]
    Motion(#[from] MotionError),

    #[error("fleet manager: {0}")]
    Fleet(#[from] FleetError),
}

impl From<&SimError> for ReturnCode {
    fn from(e: &SimError) -> ReturnCode {
        match e {
            SimError::Config(_) => ReturnCode::Failed,
            SimError::Motion(m) => ReturnCode::from(m),
            SimError::Fleet(f)  => ReturnCode::from(f),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
