//! Error types for the pool store

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Insert lost the race for `(pool, external player)`
    #[error("Player {external_player_id} has already been drafted by {drafted_by}")]
    DuplicatePick { external_player_id: i64, drafted_by: String },

    #[error("Corrupt record: {0}")]
    Corruption(String),
}

impl StoreError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }
}
