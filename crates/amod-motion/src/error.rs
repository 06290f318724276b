use amod_core::ReturnCode;
use amod_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MotionError {
    /// A task the simulator had already committed to could not proceed.
    /// The world is left as it was before the failing tick.
    #[error("{task} for entity {entity} failed: {code}")]
    Invariant {
        task:   &'static str,
        entity: u64,
        code:   ReturnCode,
    },

    #[error("invalid motion parameters: {0}")]
    Config(String),

    #[error("location index error: {0}")]
    Spatial(#[from] SpatialError),
}

impl From<&MotionError> for ReturnCode {
    fn from(e: &MotionError) -> ReturnCode {
        match e {
            MotionError::Invariant { code, .. } => *code,
            _ => ReturnCode::Failed,
        }
    }
}

pub type MotionResult<T> = Result<T, MotionError>;
