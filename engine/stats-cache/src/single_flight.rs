//! Generic TTL cache with single-flight miss handling
//!
//! A lookup first checks for a fresh entry. On a miss it either joins the fetch
//! already in flight for that key or starts one; every waiter on a fetch observes
//! the same outcome. Successful values replace the entry as a whole; failures are
//! returned to the waiters and leave the entry untouched. Expired entries are
//! swept on the miss path at most once per [`SWEEP_INTERVAL`].

use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use stats_provider::StatsError;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::metrics::CacheMetrics;

/// Minimum time between two sweeps of expired entries
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, StatsError>>>;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

pub struct SingleFlightCache<K, V> {
    entries: Arc<DashMap<K, CacheEntry<V>>>,
    in_flight: Arc<Mutex<HashMap<K, SharedFetch<V>>>>,
    metrics: Arc<CacheMetrics>,
    next_sweep: Mutex<Instant>,
}

impl<K, V> SingleFlightCache<K, V>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(metrics: Arc<CacheMetrics>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            metrics,
            next_sweep: Mutex::new(Instant::now() + SWEEP_INTERVAL),
        }
    }

    /// Return the cached value for `key`, or run `fetch` once for all
    /// concurrent callers and cache its success for `ttl`.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, ttl: Duration, fetch: F) -> Result<V, StatsError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<V, StatsError>> + Send + 'static,
    {
        if let Some(value) = self.fresh(&key) {
            self.metrics.record_hit();
            debug!("Cache hit for key: {}", key);
            return Ok(value);
        }

        self.sweep_if_due();

        let shared = {
            let mut in_flight = self.in_flight.lock();

            // The fetch may have landed between the first check and taking the lock
            if let Some(value) = self.fresh(&key) {
                self.metrics.record_hit();
                debug!("Cache hit for key: {}", key);
                return Ok(value);
            }

            self.metrics.record_miss();

            match in_flight.get(&key) {
                Some(existing) => {
                    self.metrics.record_coalesced();
                    debug!("Joining in-flight fetch for key: {}", key);
                    existing.clone()
                }
                None => {
                    debug!("Cache miss for key: {}", key);
                    let shared = self.start_fetch(key.clone(), ttl, fetch());
                    in_flight.insert(key, shared.clone());
                    shared
                }
            }
        };

        shared.await
    }

    fn start_fetch<Fut>(&self, key: K, ttl: Duration, fetch: Fut) -> SharedFetch<V>
    where
        Fut: Future<Output = Result<V, StatsError>> + Send + 'static,
    {
        let entries = Arc::clone(&self.entries);
        let in_flight = Arc::clone(&self.in_flight);
        let metrics = Arc::clone(&self.metrics);

        metrics.record_upstream_call();

        async move {
            let result = fetch.await;

            match &result {
                Ok(value) => {
                    entries.insert(
                        key.clone(),
                        CacheEntry { value: value.clone(), expires_at: Instant::now() + ttl },
                    );
                }
                Err(_) => metrics.record_upstream_failure(),
            }

            // Entry is stored before the in-flight slot is released
            in_flight.lock().remove(&key);
            result
        }
        .boxed()
        .shared()
    }

    fn sweep_if_due(&self) {
        let now = Instant::now();
        {
            let mut next_sweep = self.next_sweep.lock();
            if now < *next_sweep {
                return;
            }
            *next_sweep = now + SWEEP_INTERVAL;
        }

        let purged = self.purge_expired();
        if purged > 0 {
            debug!("Swept {} expired entries", purged);
        }
    }

    fn fresh(&self, key: &K) -> Option<V> {
        let entry = self.entries.get(key)?;
        if entry.is_fresh(Instant::now()) {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Drop the entry for `key`; the next lookup goes upstream.
    pub fn invalidate(&self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
