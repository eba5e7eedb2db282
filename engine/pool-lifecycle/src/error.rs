use chrono::NaiveDate;
use thiserror::Error;

/// Result type for lifecycle operations
pub type Result<T> = std::result::Result<T, LifecycleError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Pool start date {start} must be before end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Unknown pool phase: {0}")]
    UnknownPhase(String),
}
