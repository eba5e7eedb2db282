//! In-memory store backend (for tests and local runs)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pool_lifecycle::{DraftPick, Membership, NewDraftPick, Pool, PoolPhase};
use rule_engine::RuleSetRecord;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::{Result, StoreError};
use crate::store::{NewPool, PoolStore};

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    pools: BTreeMap<i64, Pool>,
    rule_sets: HashMap<i64, RuleSetRecord>,
    members: HashMap<i64, Vec<Membership>>,
    picks: BTreeMap<i64, DraftPick>,
}

impl State {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn member_name(&self, pool_id: i64, user_id: i64) -> String {
        self.members
            .get(&pool_id)
            .and_then(|members| members.iter().find(|member| member.user_id == user_id))
            .map(|member| member.user_name.clone())
            .unwrap_or_else(|| format!("user {}", user_id))
    }
}

/// Store held entirely in process memory. A single lock guards all state, so
/// every operation is atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPoolStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryPoolStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PoolStore for InMemoryPoolStore {
    async fn create_pool(&self, new: NewPool) -> Result<Pool> {
        let mut state = self.state.lock().await;
        let id = state.allocate_id();

        let pool = Pool {
            id,
            name: new.name,
            start_date: new.start_date,
            end_date: new.end_date,
            draft_start_date: new.draft_start_date,
            draft_end_date: new.draft_end_date,
            rule_set_id: new.rule_set_id,
            owner_id: new.owner_id,
            status: new.status,
        };

        let members = new
            .members
            .into_iter()
            .map(|member| Membership {
                pool_id: id,
                user_id: member.user_id,
                user_name: member.user_name,
                selection_completed_at: None,
            })
            .collect();

        state.pools.insert(id, pool.clone());
        state.members.insert(id, members);

        info!("Created pool {} ({})", id, pool.name);
        Ok(pool)
    }

    async fn get_pool(&self, pool_id: i64) -> Result<Pool> {
        let state = self.state.lock().await;
        state
            .pools
            .get(&pool_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("pool {}", pool_id)))
    }

    async fn list_pools(&self) -> Result<Vec<Pool>> {
        let state = self.state.lock().await;
        Ok(state.pools.values().cloned().collect())
    }

    async fn update_pool_status(&self, pool_id: i64, status: PoolPhase) -> Result<()> {
        let mut state = self.state.lock().await;
        let pool = state
            .pools
            .get_mut(&pool_id)
            .ok_or_else(|| StoreError::not_found(format!("pool {}", pool_id)))?;
        pool.status = status;
        Ok(())
    }

    async fn save_rule_set(&self, mut record: RuleSetRecord) -> Result<RuleSetRecord> {
        let mut state = self.state.lock().await;
        if record.id == 0 {
            record.id = state.allocate_id();
        }
        state.rule_sets.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_rule_set(&self, rule_set_id: i64) -> Result<RuleSetRecord> {
        let state = self.state.lock().await;
        state
            .rule_sets
            .get(&rule_set_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("rule set {}", rule_set_id)))
    }

    async fn memberships(&self, pool_id: i64) -> Result<Vec<Membership>> {
        let state = self.state.lock().await;
        if !state.pools.contains_key(&pool_id) {
            return Err(StoreError::not_found(format!("pool {}", pool_id)));
        }
        Ok(state.members.get(&pool_id).cloned().unwrap_or_default())
    }

    async fn complete_selection(
        &self,
        pool_id: i64,
        user_id: i64,
        at: DateTime<Utc>,
    ) -> Result<Membership> {
        let mut state = self.state.lock().await;
        let member = state
            .members
            .get_mut(&pool_id)
            .and_then(|members| members.iter_mut().find(|member| member.user_id == user_id))
            .ok_or_else(|| {
                StoreError::not_found(format!("member {} of pool {}", user_id, pool_id))
            })?;

        member.selection_completed_at = Some(at);
        Ok(member.clone())
    }

    async fn picks(&self, pool_id: i64) -> Result<Vec<DraftPick>> {
        let state = self.state.lock().await;
        let mut picks: Vec<DraftPick> =
            state.picks.values().filter(|pick| pick.pool_id == pool_id).cloned().collect();
        picks.sort_by_key(|pick| pick.draft_order);
        Ok(picks)
    }

    async fn get_pick(&self, pick_id: i64) -> Result<DraftPick> {
        let state = self.state.lock().await;
        state
            .picks
            .get(&pick_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("pick {}", pick_id)))
    }

    async fn insert_pick(&self, new: NewDraftPick) -> Result<DraftPick> {
        let mut state = self.state.lock().await;

        if !state.pools.contains_key(&new.pool_id) {
            return Err(StoreError::not_found(format!("pool {}", new.pool_id)));
        }

        let in_pool = state.picks.values().filter(|pick| pick.pool_id == new.pool_id);
        let mut max_order = 0;
        for pick in in_pool {
            if pick.external_player_id == new.external_player_id {
                return Err(StoreError::DuplicatePick {
                    external_player_id: new.external_player_id,
                    drafted_by: state.member_name(pick.pool_id, pick.participant_id),
                });
            }
            max_order = max_order.max(pick.draft_order);
        }

        let id = state.allocate_id();
        let pick = DraftPick {
            id,
            pool_id: new.pool_id,
            participant_id: new.participant_id,
            external_player_id: new.external_player_id,
            player_name: new.player_name,
            position: new.position,
            team_code: new.team_code,
            team_name: new.team_name,
            headshot_url: new.headshot_url,
            draft_order: max_order + 1,
            created_at: Utc::now(),
        };

        state.picks.insert(id, pick.clone());
        Ok(pick)
    }

    async fn delete_pick(&self, pick_id: i64) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .picks
            .remove(&pick_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(format!("pick {}", pick_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NewMember;
    use chrono::NaiveDate;

    fn new_pool() -> NewPool {
        NewPool {
            name: "January".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 8).unwrap(),
            draft_start_date: None,
            draft_end_date: None,
            rule_set_id: 1,
            owner_id: 1,
            status: PoolPhase::Selection,
            members: vec![
                NewMember { user_id: 1, user_name: "Alex".to_string() },
                NewMember { user_id: 2, user_name: "Sam".to_string() },
            ],
        }
    }

    fn new_pick(pool_id: i64, participant_id: i64, external_player_id: i64) -> NewDraftPick {
        NewDraftPick {
            pool_id,
            participant_id,
            external_player_id,
            player_name: format!("Player {}", external_player_id),
            position: "C".to_string(),
            team_code: "MTL".to_string(),
            team_name: None,
            headshot_url: None,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_draft_order() {
        let store = InMemoryPoolStore::new();
        let pool = store.create_pool(new_pool()).await.unwrap();

        let first = store.insert_pick(new_pick(pool.id, 1, 100)).await.unwrap();
        let second = store.insert_pick(new_pick(pool.id, 2, 101)).await.unwrap();
        assert_eq!((first.draft_order, second.draft_order), (1, 2));

        store.delete_pick(second.id).await.unwrap();
        let third = store.insert_pick(new_pick(pool.id, 2, 102)).await.unwrap();
        assert_eq!(third.draft_order, 2);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected() {
        let store = InMemoryPoolStore::new();
        let pool = store.create_pool(new_pool()).await.unwrap();

        store.insert_pick(new_pick(pool.id, 1, 100)).await.unwrap();
        let result = store.insert_pick(new_pick(pool.id, 2, 100)).await;

        match result {
            Err(StoreError::DuplicatePick { external_player_id, drafted_by }) => {
                assert_eq!(external_player_id, 100);
                assert_eq!(drafted_by, "Alex");
            }
            other => panic!("expected duplicate pick, got {:?}", other),
        }
        assert_eq!(store.picks(pool.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_complete_selection_requires_membership() {
        let store = InMemoryPoolStore::new();
        let pool = store.create_pool(new_pool()).await.unwrap();

        let member = store.complete_selection(pool.id, 2, Utc::now()).await.unwrap();
        assert!(member.selection_completed_at.is_some());

        assert!(matches!(
            store.complete_selection(pool.id, 99, Utc::now()).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_pool_is_not_found() {
        let store = InMemoryPoolStore::new();
        assert!(matches!(store.get_pool(42).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.insert_pick(new_pick(42, 1, 1)).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_save_rule_set_updates_existing_id() {
        let store = InMemoryPoolStore::new();

        let created = store
            .save_rule_set(RuleSetRecord { name: "Draft".to_string(), ..Default::default() })
            .await
            .unwrap();
        let updated = store
            .save_rule_set(RuleSetRecord { points_per_goal: 5, ..created.clone() })
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(store.get_rule_set(created.id).await.unwrap().points_per_goal, 5);
    }
}
