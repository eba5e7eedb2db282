use dashmap::DashMap;
use futures::future::join_all;
use pool_lifecycle::{Clock, DraftPick, Membership, NewDraftPick, Pool, PoolPhase};
use pool_store::{NewPool, PoolStore};
use rule_engine::{
    can_add_pick, position_counts, ExistingPick, PositionClass, RuleEngine, RuleSet, StatLine,
};
use serde::{Deserialize, Serialize};
use stats_cache::StatsCache;
use stats_provider::{PlayerSummary, StatsWindow};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::error::{PoolError, Result};
use crate::events::{EventPublisher, PoolEvent};
use crate::search::{is_searchable, PoolPlayerSearchResult};
use crate::standings::{rank_participants, rank_picks, RankedPick, Standings};

/// Outcome of one stats sync run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub pools_synced: Vec<i64>,
    pub pools_failed: Vec<i64>,
}

pub struct PoolAggregator {
    store: Arc<dyn PoolStore>,
    stats: Arc<StatsCache>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventPublisher>,
    /// Serialises admission check and insert per pool within this process
    pick_locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl PoolAggregator {
    pub fn new(
        store: Arc<dyn PoolStore>,
        stats: Arc<StatsCache>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self { store, stats, clock, events, pick_locks: DashMap::new() }
    }

    pub fn stats(&self) -> &StatsCache {
        &self.stats
    }

    /// Create a pool after validating its rule set and dates
    pub async fn create_pool(&self, new: NewPool) -> Result<Pool> {
        let record = self.store.get_rule_set(new.rule_set_id).await?;
        RuleSet::resolve(&record).validate()?;
        Pool::validate_dates(new.start_date, new.end_date)?;

        let status = PoolPhase::on(self.clock.today(), new.start_date, new.end_date);
        let pool = self.store.create_pool(NewPool { status, ..new }).await?;

        info!("Pool {} created in {} phase", pool.id, pool.status);
        Ok(pool)
    }

    /// Load a pool with its status brought up to date, persisting any change
    pub async fn refresh_pool(&self, pool_id: i64) -> Result<Pool> {
        let mut pool = self.store.get_pool(pool_id).await?;

        if pool.recompute(self.clock.today()) {
            self.store.update_pool_status(pool.id, pool.status).await?;
            info!("Pool {} is now {}", pool.id, pool.status);
        }

        Ok(pool)
    }

    pub async fn get_standings(&self, pool_id: i64, viewer_id: i64) -> Result<Standings> {
        let pool = self.refresh_pool(pool_id).await?;
        self.standings_for(&pool, viewer_id).await
    }

    async fn standings_for(&self, pool: &Pool, viewer_id: i64) -> Result<Standings> {
        let today = self.clock.today();
        let rules = RuleSet::resolve(&self.store.get_rule_set(pool.rule_set_id).await?);
        let members = self.store.memberships(pool.id).await?;
        let picks = self.store.picks(pool.id).await?;

        let viewer_phase = match members.iter().find(|m| m.user_id == viewer_id) {
            Some(member) => member.phase(pool, today),
            None => pool_lifecycle::participant_phase(today, pool.start_date, None),
        };

        let window = scoring_window(pool);
        let names = member_names(&members);
        let engine = RuleEngine::new(&rules);

        // Every pick's stats are fetched concurrently; each fetch recovers on its own
        let scored = join_all(picks.iter().map(|pick| self.score_pick(&engine, pick, window))).await;

        let ranked: Vec<RankedPick> = picks
            .iter()
            .zip(scored)
            .map(|(pick, (score, games_in_pool))| RankedPick {
                drafted_by: display_name(&names, pick.participant_id),
                can_delete: pick.participant_id == viewer_id
                    && viewer_phase == PoolPhase::Selection,
                pick: pick.clone(),
                score,
                games_in_pool,
            })
            .collect();

        let existing = existing_picks(&picks, &names);
        let viewer_pick_count =
            picks.iter().filter(|pick| pick.participant_id == viewer_id).count() as u32;

        let ranked_participants = rank_participants(&members, &ranked, pool.owner_id);

        Ok(Standings {
            pool_id: pool.id,
            pool_name: pool.name.clone(),
            pool_phase: pool.status,
            viewer_phase,
            scoring_start: window.start,
            scoring_end: window.end,
            ranked_picks: rank_picks(ranked),
            ranked_participants,
            viewer_pick_count,
            max_per_participant: rules.player_limits.max_per_participant,
            position_limits: rules.player_limits.by_position.clone(),
            position_counts: position_counts(&existing, viewer_id, &rules.limited_positions()),
        })
    }

    async fn score_pick(
        &self,
        engine: &RuleEngine<'_>,
        pick: &DraftPick,
        window: StatsWindow,
    ) -> (rule_engine::PickScore, u32) {
        let class = PositionClass::of_code(&pick.position);

        let line = async {
            match class {
                PositionClass::Goaltender => {
                    let stats = self.stats.goalie_window(pick.external_player_id, window).await;
                    StatLine {
                        wins: stats.wins,
                        shutouts: stats.shutouts,
                        games_played: stats.games_played,
                        ..Default::default()
                    }
                }
                PositionClass::Skater => {
                    let stats = self.stats.skater_window(pick.external_player_id, window).await;
                    StatLine {
                        goals: stats.goals,
                        assists: stats.assists,
                        plus_minus: stats.plus_minus,
                        games_played: stats.games_played,
                        ..Default::default()
                    }
                }
            }
        };
        let games = self.stats.team_games_in_range(&pick.team_code, window);

        let (line, games_in_pool) = tokio::join!(line, games);
        (engine.score(class, &line), games_in_pool)
    }

    /// Check whether a pick would be admitted, without inserting it
    pub async fn can_add_pick(
        &self,
        pool_id: i64,
        participant_id: i64,
        position: &str,
        external_player_id: i64,
    ) -> Result<()> {
        let pool = self.store.get_pool(pool_id).await?;
        let rules = RuleSet::resolve(&self.store.get_rule_set(pool.rule_set_id).await?);
        let members = self.store.memberships(pool_id).await?;
        let picks = self.store.picks(pool_id).await?;

        let existing = existing_picks(&picks, &member_names(&members));
        can_add_pick(&rules, &existing, participant_id, position, external_player_id)?;
        Ok(())
    }

    /// Admit and insert a pick, then announce it
    pub async fn add_pick(&self, new: NewDraftPick) -> Result<DraftPick> {
        let members = self.store.memberships(new.pool_id).await?;
        let drafter = members
            .iter()
            .find(|m| m.user_id == new.participant_id)
            .ok_or(PoolError::NotParticipant { pool_id: new.pool_id, user_id: new.participant_id })?
            .user_name
            .clone();

        let pool_id = new.pool_id;
        let lock = Arc::clone(self.pick_locks.entry(pool_id).or_default().value());
        let inserted = {
            let _guard = lock.lock().await;
            match self
                .can_add_pick(pool_id, new.participant_id, &new.position, new.external_player_id)
                .await
            {
                Ok(()) => self.store.insert_pick(new).await.map_err(PoolError::from),
                Err(e) => Err(e),
            }
        };
        self.release_pick_lock(pool_id, lock);
        let pick = inserted?;

        info!(
            "Pool {}: {} drafted {} (#{})",
            pick.pool_id, drafter, pick.player_name, pick.draft_order
        );

        self.events
            .publish(PoolEvent::PlayerSelected {
                pool_id: pick.pool_id,
                external_player_id: pick.external_player_id,
                player_name: pick.player_name.clone(),
                selected_by_name: drafter,
            })
            .await;

        Ok(pick)
    }

    /// Remove a pick. Only its owner may, and only while that owner is still
    /// in the selection phase.
    pub async fn remove_pick(&self, pool_id: i64, pick_id: i64, requester_id: i64) -> Result<()> {
        let pick = self.store.get_pick(pick_id).await?;
        if pick.pool_id != pool_id {
            return Err(PoolError::PickNotInPool { pick_id, pool_id });
        }
        if pick.participant_id != requester_id {
            return Err(PoolError::NotPickOwner { pick_id, user_id: requester_id });
        }

        let pool = self.refresh_pool(pool_id).await?;
        let members = self.store.memberships(pool_id).await?;
        let member = find_member(&members, pool_id, requester_id)?;

        let phase = member.phase(&pool, self.clock.today());
        if phase != PoolPhase::Selection {
            return Err(PoolError::PhaseViolation { phase });
        }

        self.store.delete_pick(pick_id).await?;
        info!("Pool {}: pick {} ({}) removed", pool_id, pick_id, pick.player_name);

        self.events
            .publish(PoolEvent::PlayerRemoved {
                pool_id,
                external_player_id: pick.external_player_id,
            })
            .await;

        Ok(())
    }

    /// Mark a participant's draft as finished
    pub async fn complete_selection(&self, pool_id: i64, user_id: i64) -> Result<Membership> {
        let members = self.store.memberships(pool_id).await?;
        find_member(&members, pool_id, user_id)?;

        let member = self.store.complete_selection(pool_id, user_id, self.clock.now()).await?;
        info!("Pool {}: {} completed selection", pool_id, member.user_name);
        Ok(member)
    }

    /// Name search annotated with availability in `pool_id`
    pub async fn search_players(
        &self,
        pool_id: i64,
        query: &str,
        limit: u32,
    ) -> Result<Vec<PoolPlayerSearchResult>> {
        if !is_searchable(query) {
            return Ok(Vec::new());
        }

        let pool = self.store.get_pool(pool_id).await?;
        let members = self.store.memberships(pool_id).await?;
        let picks = self.store.picks(pool_id).await?;
        let names = member_names(&members);
        let window = scoring_window(&pool);

        let drafted: HashMap<i64, String> = picks
            .iter()
            .map(|pick| (pick.external_player_id, display_name(&names, pick.participant_id)))
            .collect();

        let page = self.stats.search_players(query, limit).await;
        let games = join_all(
            page.data.iter().map(|player| self.stats.team_games_in_range(&player.team_abbrev, window)),
        )
        .await;

        Ok(page
            .data
            .into_iter()
            .zip(games)
            .map(|(player, games_in_pool)| {
                let selected_by = drafted.get(&player.id).cloned();
                PoolPlayerSearchResult {
                    is_available: selected_by.is_none(),
                    selected_by,
                    games_in_pool,
                    player,
                }
            })
            .collect())
    }

    /// This week's leaderboard
    pub async fn top_scorers(&self, limit: u32) -> Vec<PlayerSummary> {
        self.stats.top_scorers(self.clock.today(), limit).await
    }

    /// Recompute standings for every pool still in selection or active, or for
    /// one named pool whatever its phase, and announce fresh stats. A pool that
    /// fails is reported and does not stop the others.
    pub async fn sync_pools(&self, pool_id: Option<i64>) -> Result<SyncReport> {
        self.stats.purge_expired();

        let (pools, named) = match pool_id {
            Some(id) => (vec![self.store.get_pool(id).await?], true),
            None => (self.store.list_pools().await?, false),
        };

        let mut report = SyncReport::default();
        for pool in pools {
            match self.sync_pool(pool.id, named).await {
                Ok(true) => report.pools_synced.push(pool.id),
                Ok(false) => {}
                Err(e) => {
                    error!("Failed to sync pool {}: {}", pool.id, e);
                    report.pools_failed.push(pool.id);
                }
            }
        }

        info!(
            "Stats sync finished: {} synced, {} failed",
            report.pools_synced.len(),
            report.pools_failed.len()
        );
        Ok(report)
    }

    async fn sync_pool(&self, pool_id: i64, named: bool) -> Result<bool> {
        let pool = self.refresh_pool(pool_id).await?;
        if !named && !pool.status.is_live() {
            return Ok(false);
        }

        let standings = self.standings_for(&pool, pool.owner_id).await?;
        info!("Synced pool {} ({} picks)", pool.id, standings.ranked_picks.len());

        self.events.publish(PoolEvent::StatsUpdated { pool_id: pool.id }).await;
        Ok(true)
    }

    /// Forget the pool's pick lock once nobody else holds or waits on it
    fn release_pick_lock(&self, pool_id: i64, lock: Arc<Mutex<()>>) {
        // Two references left means only the map and this caller
        self.pick_locks
            .remove_if(&pool_id, |_, held| Arc::ptr_eq(held, &lock) && Arc::strong_count(held) == 2);
    }
}

fn scoring_window(pool: &Pool) -> StatsWindow {
    let (start, end) = pool.scoring_window();
    StatsWindow::new(start, end)
}

fn member_names(members: &[Membership]) -> HashMap<i64, String> {
    members.iter().map(|m| (m.user_id, m.user_name.clone())).collect()
}

fn display_name(names: &HashMap<i64, String>, user_id: i64) -> String {
    names.get(&user_id).cloned().unwrap_or_else(|| {
        warn!("Pick owner {} is not a pool member", user_id);
        format!("user {}", user_id)
    })
}

fn find_member(members: &[Membership], pool_id: i64, user_id: i64) -> Result<&Membership> {
    members
        .iter()
        .find(|m| m.user_id == user_id)
        .ok_or(PoolError::NotParticipant { pool_id, user_id })
}

fn existing_picks(picks: &[DraftPick], names: &HashMap<i64, String>) -> Vec<ExistingPick> {
    picks
        .iter()
        .map(|pick| ExistingPick {
            participant_id: pick.participant_id,
            external_player_id: pick.external_player_id,
            position: pick.position.clone(),
            draft_order: pick.draft_order,
            drafted_by: display_name(names, pick.participant_id),
        })
        .collect()
}
