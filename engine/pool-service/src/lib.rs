//! Pool Service
//!
//! Command-line entry point for the hockey pool: runs the stats sync job and
//! prints standings and the weekly leaderboard from the shared components.

pub mod config;
pub mod logging;
pub mod service;

pub use config::{LoggingConfig, ServiceConfig, ServiceSettings, StoreBackend};
pub use service::PoolService;

use anyhow::{Context, Result};
use std::path::Path;

/// Load and validate configuration. `.env` is read first when present.
pub fn load_configuration(path: Option<&Path>) -> Result<ServiceConfig> {
    dotenv::dotenv().ok();
    config::load_config(path).context("Failed to load configuration")
}
