//! Error types for pool operations

use pool_lifecycle::{LifecycleError, PoolPhase};
use pool_store::StoreError;
use rule_engine::RuleError;
use thiserror::Error;

/// Result type for pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Operation not allowed while participant is in {phase} phase")]
    PhaseViolation { phase: PoolPhase },

    #[error("User {user_id} does not own pick {pick_id}")]
    NotPickOwner { pick_id: i64, user_id: i64 },

    #[error("User {user_id} is not a participant of pool {pool_id}")]
    NotParticipant { pool_id: i64, user_id: i64 },

    #[error("Pick {pick_id} does not belong to pool {pool_id}")]
    PickNotInPool { pick_id: i64, pool_id: i64 },
}

impl From<StoreError> for PoolError {
    /// A lost insert race surfaces exactly like a rejected admission check
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicatePick { external_player_id, drafted_by } => {
                PoolError::Rule(RuleError::DuplicatePick { external_player_id, drafted_by })
            }
            other => PoolError::Store(other),
        }
    }
}

impl PoolError {
    /// Denials the caller should show to the user rather than treat as faults
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            PoolError::Rule(
                RuleError::DuplicatePick { .. } | RuleError::PositionLimitExceeded { .. }
            ) | PoolError::PhaseViolation { .. }
                | PoolError::NotPickOwner { .. }
                | PoolError::NotParticipant { .. }
        )
    }
}
