//! Pool domain events and their fan-out to connected viewers

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PoolEvent {
    PlayerSelected {
        pool_id: i64,
        external_player_id: i64,
        player_name: String,
        selected_by_name: String,
    },
    PlayerRemoved {
        pool_id: i64,
        external_player_id: i64,
    },
    StatsUpdated {
        pool_id: i64,
    },
}

impl PoolEvent {
    pub fn pool_id(&self) -> i64 {
        match self {
            PoolEvent::PlayerSelected { pool_id, .. }
            | PoolEvent::PlayerRemoved { pool_id, .. }
            | PoolEvent::StatsUpdated { pool_id } => *pool_id,
        }
    }
}

/// Outbound delivery of pool events. Delivery is best effort: publishing never
/// fails the operation that produced the event.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: PoolEvent);
}

/// Per-pool subscriber channels
pub struct PoolEventBroadcaster {
    pool_clients: Arc<RwLock<HashMap<i64, Vec<mpsc::UnboundedSender<PoolEvent>>>>>,
}

impl PoolEventBroadcaster {
    pub fn new() -> Self {
        Self { pool_clients: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Register a viewer of `pool_id` and return its event stream
    pub async fn subscribe(&self, pool_id: i64) -> mpsc::UnboundedReceiver<PoolEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut clients = self.pool_clients.write().await;
        clients.entry(pool_id).or_insert_with(Vec::new).push(sender);
        receiver
    }

    pub async fn client_count(&self, pool_id: i64) -> usize {
        let clients = self.pool_clients.read().await;
        clients.get(&pool_id).map_or(0, |v| v.len())
    }

    pub async fn total_client_count(&self) -> usize {
        let clients = self.pool_clients.read().await;
        clients.values().map(|v| v.len()).sum()
    }
}

impl Default for PoolEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for PoolEventBroadcaster {
    async fn publish(&self, event: PoolEvent) {
        let pool_id = event.pool_id();
        let mut clients = self.pool_clients.write().await;

        let Some(pool_clients) = clients.get_mut(&pool_id) else {
            debug!("No subscribers for pool {}", pool_id);
            return;
        };

        // Viewers that went away are pruned on the next publish
        pool_clients.retain(|sender| match sender.send(event.clone()) {
            Ok(()) => true,
            Err(e) => {
                warn!("Dropping closed subscriber of pool {}: {}", pool_id, e);
                false
            }
        });

        if pool_clients.is_empty() {
            clients.remove(&pool_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_reach_only_their_pool() {
        let broadcaster = PoolEventBroadcaster::new();
        let mut pool_one = broadcaster.subscribe(1).await;
        let mut pool_two = broadcaster.subscribe(2).await;

        broadcaster.publish(PoolEvent::StatsUpdated { pool_id: 1 }).await;

        assert_eq!(pool_one.recv().await, Some(PoolEvent::StatsUpdated { pool_id: 1 }));
        assert!(pool_two.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_subscribers_are_pruned() {
        let broadcaster = PoolEventBroadcaster::new();
        let receiver = broadcaster.subscribe(1).await;
        let _kept = broadcaster.subscribe(1).await;
        assert_eq!(broadcaster.client_count(1).await, 2);

        drop(receiver);
        broadcaster.publish(PoolEvent::PlayerRemoved { pool_id: 1, external_player_id: 5 }).await;
        assert_eq!(broadcaster.client_count(1).await, 1);
        assert_eq!(broadcaster.total_client_count().await, 1);
    }

    #[test]
    fn test_event_wire_shape() {
        let event = PoolEvent::PlayerSelected {
            pool_id: 3,
            external_player_id: 8478402,
            player_name: "Connor McDavid".to_string(),
            selected_by_name: "Alex".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "player_selected");
        assert_eq!(json["selected_by_name"], "Alex");
    }
}
