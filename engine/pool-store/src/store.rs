use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use pool_lifecycle::{DraftPick, Membership, NewDraftPick, Pool, PoolPhase};
use rule_engine::RuleSetRecord;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
    pub user_id: i64,
    pub user_name: String,
}

/// Pool as submitted for creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPool {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub draft_start_date: Option<NaiveDate>,
    pub draft_end_date: Option<NaiveDate>,
    pub rule_set_id: i64,
    pub owner_id: i64,
    pub status: PoolPhase,
    pub members: Vec<NewMember>,
}

/// Storage for pools and everything they own
#[async_trait]
pub trait PoolStore: Send + Sync {
    async fn create_pool(&self, pool: NewPool) -> Result<Pool>;

    async fn get_pool(&self, pool_id: i64) -> Result<Pool>;

    async fn list_pools(&self) -> Result<Vec<Pool>>;

    async fn update_pool_status(&self, pool_id: i64, status: PoolPhase) -> Result<()>;

    async fn save_rule_set(&self, record: RuleSetRecord) -> Result<RuleSetRecord>;

    async fn get_rule_set(&self, rule_set_id: i64) -> Result<RuleSetRecord>;

    /// Members in the order they joined
    async fn memberships(&self, pool_id: i64) -> Result<Vec<Membership>>;

    async fn complete_selection(
        &self,
        pool_id: i64,
        user_id: i64,
        at: DateTime<Utc>,
    ) -> Result<Membership>;

    /// Picks ordered by draft order
    async fn picks(&self, pool_id: i64) -> Result<Vec<DraftPick>>;

    async fn get_pick(&self, pick_id: i64) -> Result<DraftPick>;

    /// Insert-if-absent keyed by `(pool, external player)`, assigning the next
    /// draft order in the same atomic step. Fails with `DuplicatePick` when the
    /// player is already in the pool.
    async fn insert_pick(&self, pick: NewDraftPick) -> Result<DraftPick>;

    async fn delete_pick(&self, pick_id: i64) -> Result<()>;
}
