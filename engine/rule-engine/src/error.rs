//! Error types for rule evaluation and pick admission

use thiserror::Error;

/// Result type for rule engine operations
pub type Result<T> = std::result::Result<T, RuleError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Invalid rule set: {0}")]
    InvalidRuleSet(String),

    #[error("Player {external_player_id} has already been drafted by {drafted_by}")]
    DuplicatePick { external_player_id: i64, drafted_by: String },

    #[error("Limit of {limit} players at position {position} reached")]
    PositionLimitExceeded { position: String, limit: u32 },

    #[error("Unknown position code: {0}")]
    UnknownPosition(String),
}

impl RuleError {
    pub fn invalid_rule_set(msg: impl Into<String>) -> Self {
        RuleError::InvalidRuleSet(msg.into())
    }

    /// Stable machine-readable code for callers that surface denials
    pub fn code(&self) -> &'static str {
        match self {
            RuleError::InvalidRuleSet(_) => "invalid_rule_set",
            RuleError::DuplicatePick { .. } => "duplicate_pick",
            RuleError::PositionLimitExceeded { .. } => "position_limit_exceeded",
            RuleError::UnknownPosition(_) => "unknown_position",
        }
    }
}
