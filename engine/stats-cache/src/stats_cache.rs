use chrono::NaiveDate;
use stats_provider::{
    GoalieWindowStats, PlayerPage, PlayerSummary, SkaterWindowStats, StatsError, StatsProvider,
    StatsWindow,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::CacheTtlConfig;
use crate::key::StatsKey;
use crate::metrics::{CacheMetrics, CacheMetricsSnapshot};
use crate::single_flight::SingleFlightCache;

/// Typed cache over a [`StatsProvider`].
///
/// Every lookup is infallible for the caller: an upstream failure is logged and
/// answered with the zero value of the data class, and nothing is cached for it.
pub struct StatsCache {
    provider: Arc<dyn StatsProvider>,
    ttl: CacheTtlConfig,
    metrics: Arc<CacheMetrics>,
    top_scorers: SingleFlightCache<StatsKey, Vec<PlayerSummary>>,
    pages: SingleFlightCache<StatsKey, PlayerPage>,
    team_games: SingleFlightCache<StatsKey, u32>,
    skaters: SingleFlightCache<StatsKey, SkaterWindowStats>,
    goalies: SingleFlightCache<StatsKey, GoalieWindowStats>,
}

impl StatsCache {
    pub fn new(provider: Arc<dyn StatsProvider>, ttl: CacheTtlConfig) -> Self {
        let metrics = Arc::new(CacheMetrics::new());

        Self {
            provider,
            ttl,
            top_scorers: SingleFlightCache::new(Arc::clone(&metrics)),
            pages: SingleFlightCache::new(Arc::clone(&metrics)),
            team_games: SingleFlightCache::new(Arc::clone(&metrics)),
            skaters: SingleFlightCache::new(Arc::clone(&metrics)),
            goalies: SingleFlightCache::new(Arc::clone(&metrics)),
            metrics,
        }
    }

    /// Leaderboard for the Monday to Sunday week containing `today`
    pub async fn top_scorers(&self, today: NaiveDate, limit: u32) -> Vec<PlayerSummary> {
        let week = StatsWindow::week_of(today);
        let key = StatsKey::TopScorers { week, limit };
        let provider = Arc::clone(&self.provider);

        let result = self
            .top_scorers
            .get_or_fetch(key.clone(), self.ttl.top_scorers(), move || async move {
                provider.top_scorers(week, limit).await
            })
            .await;

        recover(&key, result)
    }

    pub async fn list_players(&self, start: u32, limit: u32) -> PlayerPage {
        let key = StatsKey::Roster { start, limit };
        let provider = Arc::clone(&self.provider);

        let result = self
            .pages
            .get_or_fetch(key.clone(), self.ttl.roster(), move || async move {
                provider.list_players(start, limit).await
            })
            .await;

        recover(&key, result)
    }

    pub async fn search_players(&self, query: &str, limit: u32) -> PlayerPage {
        let key = StatsKey::search(query, limit);
        let provider = Arc::clone(&self.provider);
        let query = query.trim().to_string();

        let result = self
            .pages
            .get_or_fetch(key.clone(), self.ttl.search(), move || async move {
                provider.search_players(&query, limit).await
            })
            .await;

        recover(&key, result)
    }

    pub async fn team_games_in_range(&self, team: &str, window: StatsWindow) -> u32 {
        let key = StatsKey::TeamGames { team: team.to_string(), window };
        let provider = Arc::clone(&self.provider);
        let team = team.to_string();

        let result = self
            .team_games
            .get_or_fetch(key.clone(), self.ttl.team_games(), move || async move {
                provider.team_games_in_range(&team, window).await
            })
            .await;

        recover(&key, result)
    }

    pub async fn skater_window(&self, player_id: i64, window: StatsWindow) -> SkaterWindowStats {
        let key = StatsKey::SkaterWindow { player_id, window };
        let provider = Arc::clone(&self.provider);

        let result = self
            .skaters
            .get_or_fetch(key.clone(), self.ttl.player_window(), move || async move {
                provider.skater_window(player_id, window).await
            })
            .await;

        recover(&key, result)
    }

    pub async fn goalie_window(&self, player_id: i64, window: StatsWindow) -> GoalieWindowStats {
        let key = StatsKey::GoalieWindow { player_id, window };
        let provider = Arc::clone(&self.provider);

        let result = self
            .goalies
            .get_or_fetch(key.clone(), self.ttl.player_window(), move || async move {
                provider.goalie_window(player_id, window).await
            })
            .await;

        recover(&key, result)
    }

    /// Drop one cached entry
    pub fn invalidate(&self, key: &StatsKey) -> bool {
        match key {
            StatsKey::TopScorers { .. } => self.top_scorers.invalidate(key),
            StatsKey::Roster { .. } | StatsKey::Search { .. } => self.pages.invalidate(key),
            StatsKey::TeamGames { .. } => self.team_games.invalidate(key),
            StatsKey::SkaterWindow { .. } => self.skaters.invalidate(key),
            StatsKey::GoalieWindow { .. } => self.goalies.invalidate(key),
        }
    }

    /// Remove expired entries from every data class
    pub fn purge_expired(&self) -> usize {
        let purged = self.top_scorers.purge_expired()
            + self.pages.purge_expired()
            + self.team_games.purge_expired()
            + self.skaters.purge_expired()
            + self.goalies.purge_expired();

        if purged > 0 {
            info!("Purged {} expired stats entries", purged);
        }
        purged
    }

    /// Entries held across every data class, fresh or not yet swept
    pub fn len(&self) -> usize {
        self.top_scorers.len()
            + self.pages.len()
            + self.team_games.len()
            + self.skaters.len()
            + self.goalies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn metrics(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn ttl(&self) -> &CacheTtlConfig {
        &self.ttl
    }
}

fn recover<V: Default>(key: &StatsKey, result: Result<V, StatsError>) -> V {
    match result {
        Ok(value) => value,
        Err(StatsError::UnknownTeam(team)) => {
            info!("No schedule for unknown team {}, using 0 games", team);
            V::default()
        }
        Err(e) => {
            warn!("Upstream unavailable for {}: {}; using empty result", key, e);
            V::default()
        }
    }
}
