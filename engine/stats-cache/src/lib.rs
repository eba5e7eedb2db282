//! Stats Cache
//!
//! Process-wide cache in front of the stats provider. Concurrent misses for the
//! same key collapse into one upstream call, successful values live for a
//! per-data-class TTL, and failures are never stored: callers get a zero-valued
//! result and the next lookup goes upstream again.

pub mod config;
pub mod key;
pub mod metrics;
pub mod single_flight;
pub mod stats_cache;

pub use config::CacheTtlConfig;
pub use key::StatsKey;
pub use metrics::{CacheMetrics, CacheMetricsSnapshot};
pub use single_flight::SingleFlightCache;
pub use stats_cache::StatsCache;
