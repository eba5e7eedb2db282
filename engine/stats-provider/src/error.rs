//! Error types for the stats provider

use thiserror::Error;

/// Result type for stats provider operations
pub type Result<T> = std::result::Result<T, StatsError>;

/// Upstream failures. Cloneable so that every waiter on a shared fetch
/// observes the same failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Upstream returned status {status}")]
    Status { status: u16 },

    #[error("Upstream request timed out")]
    Timeout,

    #[error("Malformed upstream payload: {0}")]
    Malformed(String),

    #[error("Unknown team abbreviation: {0}")]
    UnknownTeam(String),
}

impl From<reqwest::Error> for StatsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StatsError::Timeout
        } else if err.is_decode() {
            StatsError::Malformed(err.to_string())
        } else {
            StatsError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StatsError {
    fn from(err: serde_json::Error) -> Self {
        StatsError::Malformed(err.to_string())
    }
}
