use amod_core::ReturnCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("bookings file line {line}: {reason}")]
    Parse { line: u64, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<&ScheduleError> for ReturnCode {
    fn from(_: &ScheduleError) -> ReturnCode {
        ReturnCode::ErrorReadingBookingsFile
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
