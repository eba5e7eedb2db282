//! Postgres store backend

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use pool_lifecycle::{DraftPick, Membership, NewDraftPick, Pool, PoolPhase};
use rule_engine::rules::{DynamicRules, PositionLimit};
use rule_engine::RuleSetRecord;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use std::collections::BTreeMap;
use tracing::info;

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::store::{NewPool, PoolStore};

#[derive(sqlx::FromRow)]
struct PoolRow {
    id: i64,
    name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    draft_start_date: Option<NaiveDate>,
    draft_end_date: Option<NaiveDate>,
    rule_set_id: i64,
    owner_id: i64,
    status: String,
}

impl TryFrom<PoolRow> for Pool {
    type Error = StoreError;

    fn try_from(row: PoolRow) -> Result<Self> {
        let status = row
            .status
            .parse::<PoolPhase>()
            .map_err(|e| StoreError::corruption(format!("pool {}: {}", row.id, e)))?;

        Ok(Pool {
            id: row.id,
            name: row.name,
            start_date: row.start_date,
            end_date: row.end_date,
            draft_start_date: row.draft_start_date,
            draft_end_date: row.draft_end_date,
            rule_set_id: row.rule_set_id,
            owner_id: row.owner_id,
            status,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RuleSetRow {
    id: i64,
    name: String,
    points_per_goal: i32,
    points_per_assist: i32,
    points_per_shutout: i32,
    points_per_victory: i32,
    points_per_defeat: i32,
    points_per_overtime: i32,
    max_players_per_user: Option<i32>,
    position_limits: Option<Json<BTreeMap<String, PositionLimit>>>,
    rules: Option<Json<DynamicRules>>,
}

impl From<RuleSetRow> for RuleSetRecord {
    fn from(row: RuleSetRow) -> Self {
        RuleSetRecord {
            id: row.id,
            name: row.name,
            points_per_goal: row.points_per_goal,
            points_per_assist: row.points_per_assist,
            points_per_shutout: row.points_per_shutout,
            points_per_victory: row.points_per_victory,
            points_per_defeat: row.points_per_defeat,
            points_per_overtime: row.points_per_overtime,
            max_players_per_user: row.max_players_per_user,
            position_limits: row.position_limits.map(|Json(limits)| limits),
            rules: row.rules.map(|Json(rules)| rules),
        }
    }
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    pool_id: i64,
    user_id: i64,
    user_name: String,
    selection_completed_at: Option<DateTime<Utc>>,
}

impl From<MemberRow> for Membership {
    fn from(row: MemberRow) -> Self {
        Membership {
            pool_id: row.pool_id,
            user_id: row.user_id,
            user_name: row.user_name,
            selection_completed_at: row.selection_completed_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PickRow {
    id: i64,
    pool_id: i64,
    participant_id: i64,
    external_player_id: i64,
    player_name: String,
    position: String,
    team_code: String,
    team_name: Option<String>,
    headshot_url: Option<String>,
    draft_order: i32,
    created_at: DateTime<Utc>,
}

impl From<PickRow> for DraftPick {
    fn from(row: PickRow) -> Self {
        DraftPick {
            id: row.id,
            pool_id: row.pool_id,
            participant_id: row.participant_id,
            external_player_id: row.external_player_id,
            player_name: row.player_name,
            position: row.position,
            team_code: row.team_code,
            team_name: row.team_name,
            headshot_url: row.headshot_url,
            draft_order: row.draft_order,
            created_at: row.created_at,
        }
    }
}

const POOL_COLUMNS: &str = "id, name, start_date, end_date, draft_start_date, draft_end_date, \
                            rule_set_id, owner_id, status";

const RULE_SET_COLUMNS: &str = "id, name, points_per_goal, points_per_assist, points_per_shutout, \
                                points_per_victory, points_per_defeat, points_per_overtime, \
                                max_players_per_user, position_limits, rules";

const PICK_COLUMNS: &str = "id, pool_id, participant_id, external_player_id, player_name, position, \
                            team_code, team_name, headshot_url, draft_order, created_at";

pub struct PgPoolStore {
    pool: PgPool,
}

impl PgPoolStore {
    /// Connect and, when configured, apply the bundled migrations
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;

        if config.run_migrations {
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Database migrations applied");
        }

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PoolStore for PgPoolStore {
    async fn create_pool(&self, new: NewPool) -> Result<Pool> {
        let mut tx = self.pool.begin().await?;

        // Member display names are kept current from the roster being created
        for member in &new.members {
            sqlx::query(
                "INSERT INTO users (id, name) VALUES ($1, $2) \
                 ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
            )
            .bind(member.user_id)
            .bind(&member.user_name)
            .execute(&mut *tx)
            .await?;
        }

        let row: PoolRow = sqlx::query_as(&format!(
            "INSERT INTO pools (name, start_date, end_date, draft_start_date, draft_end_date, \
             rule_set_id, owner_id, status) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {}",
            POOL_COLUMNS
        ))
        .bind(&new.name)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.draft_start_date)
        .bind(new.draft_end_date)
        .bind(new.rule_set_id)
        .bind(new.owner_id)
        .bind(new.status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for member in &new.members {
            sqlx::query(
                "INSERT INTO pool_members (pool_id, user_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(row.id)
            .bind(member.user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let pool = Pool::try_from(row)?;
        info!("Created pool {} ({})", pool.id, pool.name);
        Ok(pool)
    }

    async fn get_pool(&self, pool_id: i64) -> Result<Pool> {
        let row: Option<PoolRow> =
            sqlx::query_as(&format!("SELECT {} FROM pools WHERE id = $1", POOL_COLUMNS))
                .bind(pool_id)
                .fetch_optional(&self.pool)
                .await?;

        row.ok_or_else(|| StoreError::not_found(format!("pool {}", pool_id)))?.try_into()
    }

    async fn list_pools(&self) -> Result<Vec<Pool>> {
        let rows: Vec<PoolRow> =
            sqlx::query_as(&format!("SELECT {} FROM pools ORDER BY id", POOL_COLUMNS))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Pool::try_from).collect()
    }

    async fn update_pool_status(&self, pool_id: i64, status: PoolPhase) -> Result<()> {
        let result = sqlx::query("UPDATE pools SET status = $2 WHERE id = $1")
            .bind(pool_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("pool {}", pool_id)));
        }
        Ok(())
    }

    /// Insert a new rule set, or replace the one with `record.id` when it is set
    async fn save_rule_set(&self, record: RuleSetRecord) -> Result<RuleSetRecord> {
        let id = (record.id != 0).then_some(record.id);

        let row: RuleSetRow = sqlx::query_as(&format!(
            "INSERT INTO rule_sets ({}) VALUES \
             (COALESCE($1, nextval(pg_get_serial_sequence('rule_sets', 'id'))), \
             $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, \
             points_per_goal = EXCLUDED.points_per_goal, \
             points_per_assist = EXCLUDED.points_per_assist, \
             points_per_shutout = EXCLUDED.points_per_shutout, \
             points_per_victory = EXCLUDED.points_per_victory, \
             points_per_defeat = EXCLUDED.points_per_defeat, \
             points_per_overtime = EXCLUDED.points_per_overtime, \
             max_players_per_user = EXCLUDED.max_players_per_user, \
             position_limits = EXCLUDED.position_limits, rules = EXCLUDED.rules \
             RETURNING {}",
            RULE_SET_COLUMNS, RULE_SET_COLUMNS
        ))
        .bind(id)
        .bind(&record.name)
        .bind(record.points_per_goal)
        .bind(record.points_per_assist)
        .bind(record.points_per_shutout)
        .bind(record.points_per_victory)
        .bind(record.points_per_defeat)
        .bind(record.points_per_overtime)
        .bind(record.max_players_per_user)
        .bind(record.position_limits.as_ref().map(Json))
        .bind(record.rules.as_ref().map(Json))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get_rule_set(&self, rule_set_id: i64) -> Result<RuleSetRecord> {
        let row: Option<RuleSetRow> =
            sqlx::query_as(&format!("SELECT {} FROM rule_sets WHERE id = $1", RULE_SET_COLUMNS))
                .bind(rule_set_id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(RuleSetRecord::from)
            .ok_or_else(|| StoreError::not_found(format!("rule set {}", rule_set_id)))
    }

    async fn memberships(&self, pool_id: i64) -> Result<Vec<Membership>> {
        let rows: Vec<MemberRow> = sqlx::query_as(
            "SELECT m.pool_id, m.user_id, u.name AS user_name, m.selection_completed_at \
             FROM pool_members m JOIN users u ON u.id = m.user_id \
             WHERE m.pool_id = $1 ORDER BY m.joined_at, m.user_id",
        )
        .bind(pool_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Membership::from).collect())
    }

    async fn complete_selection(
        &self,
        pool_id: i64,
        user_id: i64,
        at: DateTime<Utc>,
    ) -> Result<Membership> {
        let row: Option<MemberRow> = sqlx::query_as(
            "UPDATE pool_members m SET selection_completed_at = $3 FROM users u \
             WHERE m.pool_id = $1 AND m.user_id = $2 AND u.id = m.user_id \
             RETURNING m.pool_id, m.user_id, u.name AS user_name, m.selection_completed_at",
        )
        .bind(pool_id)
        .bind(user_id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Membership::from).ok_or_else(|| {
            StoreError::not_found(format!("member {} of pool {}", user_id, pool_id))
        })
    }

    async fn picks(&self, pool_id: i64) -> Result<Vec<DraftPick>> {
        let rows: Vec<PickRow> = sqlx::query_as(&format!(
            "SELECT {} FROM draft_picks WHERE pool_id = $1 ORDER BY draft_order",
            PICK_COLUMNS
        ))
        .bind(pool_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DraftPick::from).collect())
    }

    async fn get_pick(&self, pick_id: i64) -> Result<DraftPick> {
        let row: Option<PickRow> =
            sqlx::query_as(&format!("SELECT {} FROM draft_picks WHERE id = $1", PICK_COLUMNS))
                .bind(pick_id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(DraftPick::from).ok_or_else(|| StoreError::not_found(format!("pick {}", pick_id)))
    }

    async fn insert_pick(&self, new: NewDraftPick) -> Result<DraftPick> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the pool serialises draft order assignment per pool
        let locked: Option<i64> = sqlx::query_scalar("SELECT id FROM pools WHERE id = $1 FOR UPDATE")
            .bind(new.pool_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(StoreError::not_found(format!("pool {}", new.pool_id)));
        }

        let inserted: Option<PickRow> = sqlx::query_as(&format!(
            "INSERT INTO draft_picks (pool_id, participant_id, external_player_id, player_name, \
             position, team_code, team_name, headshot_url, draft_order) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, \
             (SELECT COALESCE(MAX(draft_order), 0) + 1 FROM draft_picks WHERE pool_id = $1)) \
             ON CONFLICT (pool_id, external_player_id) DO NOTHING \
             RETURNING {}",
            PICK_COLUMNS
        ))
        .bind(new.pool_id)
        .bind(new.participant_id)
        .bind(new.external_player_id)
        .bind(&new.player_name)
        .bind(&new.position)
        .bind(&new.team_code)
        .bind(&new.team_name)
        .bind(&new.headshot_url)
        .fetch_optional(&mut *tx)
        .await?;

        match inserted {
            Some(row) => {
                tx.commit().await?;
                Ok(row.into())
            }
            None => {
                let drafted_by: Option<String> = sqlx::query_scalar(
                    "SELECT u.name FROM draft_picks p JOIN users u ON u.id = p.participant_id \
                     WHERE p.pool_id = $1 AND p.external_player_id = $2",
                )
                .bind(new.pool_id)
                .bind(new.external_player_id)
                .fetch_optional(&mut *tx)
                .await?;

                tx.rollback().await?;
                Err(StoreError::DuplicatePick {
                    external_player_id: new.external_player_id,
                    drafted_by: drafted_by.unwrap_or_else(|| "another participant".to_string()),
                })
            }
        }
    }

    async fn delete_pick(&self, pick_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM draft_picks WHERE id = $1")
            .bind(pick_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("pick {}", pick_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NewMember;
    use std::sync::Arc;

    // These run against a real database: DATABASE_URL=... cargo test -- --ignored
    async fn connect() -> PgPoolStore {
        let config = StoreConfig::from_env();
        PgPoolStore::connect(&config).await.expect("DATABASE_URL must point at a test database")
    }

    async fn seed_pool(store: &PgPoolStore) -> Pool {
        let rules = store
            .save_rule_set(RuleSetRecord {
                name: "Standard".to_string(),
                points_per_goal: 2,
                points_per_assist: 1,
                ..Default::default()
            })
            .await
            .unwrap();

        store
            .create_pool(NewPool {
                name: "Integration".to_string(),
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 1, 8).unwrap(),
                draft_start_date: None,
                draft_end_date: None,
                rule_set_id: rules.id,
                owner_id: 900_001,
                status: PoolPhase::Selection,
                members: vec![
                    NewMember { user_id: 900_001, user_name: "Alex".to_string() },
                    NewMember { user_id: 900_002, user_name: "Sam".to_string() },
                ],
            })
            .await
            .unwrap()
    }

    fn new_pick(pool_id: i64, participant_id: i64, external_player_id: i64) -> NewDraftPick {
        NewDraftPick {
            pool_id,
            participant_id,
            external_player_id,
            player_name: format!("Player {}", external_player_id),
            position: "D".to_string(),
            team_code: "MTL".to_string(),
            team_name: Some("Montreal Canadiens".to_string()),
            headshot_url: None,
        }
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_duplicate_insert_names_drafter() {
        let store = connect().await;
        let pool = seed_pool(&store).await;

        store.insert_pick(new_pick(pool.id, 900_001, 8478402)).await.unwrap();
        let result = store.insert_pick(new_pick(pool.id, 900_002, 8478402)).await;

        match result {
            Err(StoreError::DuplicatePick { external_player_id, drafted_by }) => {
                assert_eq!(external_player_id, 8478402);
                assert_eq!(drafted_by, "Alex");
            }
            other => panic!("expected duplicate pick, got {:?}", other),
        }
        assert_eq!(store.picks(pool.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_concurrent_inserts_get_unique_draft_orders() {
        let store = Arc::new(connect().await);
        let pool_id = seed_pool(&store).await.id;

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = Arc::clone(&store);
                let participant = 900_001 + (i % 2);
                tokio::spawn(async move {
                    store.insert_pick(new_pick(pool_id, participant, 500 + i)).await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let orders: Vec<i32> =
            store.picks(pool_id).await.unwrap().iter().map(|p| p.draft_order).collect();
        assert_eq!(orders, (1..=20).collect::<Vec<i32>>());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_save_rule_set_updates_existing_id() {
        let store = connect().await;

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
