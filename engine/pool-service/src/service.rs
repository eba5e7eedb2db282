//! Component wiring

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use pool_aggregator::{PoolAggregator, PoolEventBroadcaster};
use pool_lifecycle::SystemClock;
use pool_store::{InMemoryPoolStore, PgPoolStore, PoolStore};
use stats_cache::StatsCache;
use stats_provider::NhlStatsProvider;

use crate::config::{ServiceConfig, StoreBackend};

/// Long-lived components shared by every command
pub struct PoolService {
    pub config: ServiceConfig,
    pub aggregator: Arc<PoolAggregator>,
    pub events: Arc<PoolEventBroadcaster>,
}

impl PoolService {
    pub async fn new(config: ServiceConfig) -> Result<Self> {
        let provider = NhlStatsProvider::new(config.stats.clone())
            .context("Failed to create NHL stats client")?;
        let stats = Arc::new(StatsCache::new(Arc::new(provider), config.cache.clone()));

        let store: Arc<dyn PoolStore> = match config.service.store_backend {
            StoreBackend::Postgres => Arc::new(
                PgPoolStore::connect(&config.store)
                    .await
                    .context("Failed to connect to pool database")?,
            ),
            StoreBackend::Memory => {
                info!("Using in-memory pool store; nothing will be persisted");
                Arc::new(InMemoryPoolStore::new())
            }
        };

        let events = Arc::new(PoolEventBroadcaster::new());
        let aggregator = Arc::new(PoolAggregator::new(
            store,
            stats,
            Arc::new(SystemClock),
            events.clone(),
        ));

        info!("Pool service initialized (season {})", config.stats.season_id);
        Ok(Self { config, aggregator, events })
    }
}
