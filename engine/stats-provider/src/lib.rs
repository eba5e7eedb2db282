//! NHL Stats Provider
//!
//! Thin client over the public NHL statistics endpoints. It shapes the upstream
//! query parameters for a date window and normalizes the per-game records it gets
//! back into window totals for skaters and goaltenders.

pub mod config;
pub mod error;
pub mod models;
pub mod provider;
pub mod query;
pub mod teams;

pub use config::StatsProviderConfig;
pub use error::{Result, StatsError};
pub use models::*;
pub use provider::{NhlStatsProvider, StatsProvider};
