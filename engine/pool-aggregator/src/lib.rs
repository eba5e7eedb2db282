//! Pool Aggregator
//!
//! Orchestrates the store, the stats cache and the rule engine to answer the two
//! questions the rest of the application asks of a pool: what the standings are
//! right now, and whether a draft pick is legal. Pick changes and stats syncs are
//! announced as [`PoolEvent`]s through an injected publisher.

pub mod aggregator;
pub mod error;
pub mod events;
pub mod search;
pub mod standings;

pub use aggregator::{PoolAggregator, SyncReport};
pub use error::{PoolError, Result};
pub use events::{EventPublisher, PoolEvent, PoolEventBroadcaster};
pub use search::PoolPlayerSearchResult;
pub use standings::{ParticipantStanding, RankedPick, Standings};
