use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::StatsProviderConfig;
use crate::error::{Result, StatsError};
use crate::models::*;
use crate::query;
use crate::teams;

/// Source of player statistics.
///
/// Implementations report upstream failures as errors; the caching layer
/// decides how those surface to callers.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Weekly leaderboard, aggregated over every game in `week`
    async fn top_scorers(&self, week: StatsWindow, limit: u32) -> Result<Vec<PlayerSummary>>;

    /// Season roster page ordered by last then first name
    async fn list_players(&self, start: u32, limit: u32) -> Result<PlayerPage>;

    /// Case-insensitive name search ordered by points then goals
    async fn search_players(&self, query: &str, limit: u32) -> Result<PlayerPage>;

    /// Number of scheduled games for `team` whose date falls inside `window`
    async fn team_games_in_range(&self, team: &str, window: StatsWindow) -> Result<u32>;

    /// Skater totals summed over the games in `window`
    async fn skater_window(&self, player_id: i64, window: StatsWindow)
        -> Result<SkaterWindowStats>;

    /// Goaltender totals summed over the games in `window`
    async fn goalie_window(&self, player_id: i64, window: StatsWindow)
        -> Result<GoalieWindowStats>;
}

/// HTTP client for the public NHL stats and web APIs
pub struct NhlStatsProvider {
    config: StatsProviderConfig,
    client: Client,
}

impl NhlStatsProvider {
    pub fn new(config: StatsProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| StatsError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &StatsProviderConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, params: &[(&str, String)]) -> Result<T> {
        debug!("GET {} {:?}", url, params);

        let response = self.client.get(url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Upstream request to {} failed with status {}", url, status);
            return Err(StatsError::Status { status: status.as_u16() });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn skater_summary(&self, params: &[(&str, String)]) -> Result<ApiResponse<SkaterRecord>> {
        let url = format!("{}/skater/summary", self.config.stats_base_url);
        self.get_json(&url, params).await
    }

    fn summaries(&self, records: &[SkaterRecord]) -> Vec<PlayerSummary> {
        records
            .iter()
            .map(|record| PlayerSummary::from_record(record, &self.config.season_id))
            .collect()
    }
}

#[async_trait]
impl StatsProvider for NhlStatsProvider {
    async fn top_scorers(&self, week: StatsWindow, limit: u32) -> Result<Vec<PlayerSummary>> {
        let params = [
            ("isAggregate", "true".to_string()),
            ("isGame", "true".to_string()),
            ("sort", query::sort_param(query::SCORING_SORT)),
            ("start", "0".to_string()),
            ("limit", limit.to_string()),
            ("cayenneExp", query::games_in_window(self.config.game_type_id, &week)),
        ];

        let response = self.skater_summary(&params).await?;
        info!(
            "Fetched {} top scorers for week {} to {}",
            response.data.len(),
            week.start_str(),
            week.end_str()
        );

        Ok(self.summaries(&response.data))
    }

    async fn list_players(&self, start: u32, limit: u32) -> Result<PlayerPage> {
        let params = [
            ("isAggregate", "false".to_string()),
            ("isGame", "false".to_string()),
            ("sort", query::sort_param(query::ROSTER_SORT)),
            ("start", start.to_string()),
            ("limit", limit.to_string()),
            ("cayenneExp", query::season(&self.config.season_id, self.config.game_type_id)),
        ];

        let response = self.skater_summary(&params).await?;
        Ok(PlayerPage { data: self.summaries(&response.data), total: response.total })
    }

    async fn search_players(&self, search: &str, limit: u32) -> Result<PlayerPage> {
        let params = [
            ("isAggregate", "false".to_string()),
            ("isGame", "false".to_string()),
            ("sort", query::sort_param(query::SEARCH_SORT)),
            ("start", "0".to_string()),
            ("limit", limit.to_string()),
            (
                "cayenneExp",
                query::name_search(&self.config.season_id, self.config.game_type_id, search),
            ),
        ];

        let response = self.skater_summary(&params).await?;
        debug!("Search '{}' matched {} players", search, response.total);

        Ok(PlayerPage { data: self.summaries(&response.data), total: response.total })
    }

    async fn team_games_in_range(&self, team: &str, window: StatsWindow) -> Result<u32> {
        if teams::team_id(team).is_none() {
            return Err(StatsError::UnknownTeam(team.to_string()));
        }

        let url = format!("{}/club-schedule-season/{}/now", self.config.web_base_url, team);
        let schedule: ScheduleResponse = self.get_json(&url, &[]).await?;

        let count = schedule
            .games
            .iter()
            .filter_map(ScheduledGame::date)
            .filter(|day| window.contains(*day))
            .count();

        Ok(count as u32)
    }

    async fn skater_window(&self, player_id: i64, window: StatsWindow) -> Result<SkaterWindowStats> {
        let params = [
            ("isAggregate", "false".to_string()),
            ("isGame", "true".to_string()),
            ("start", "0".to_string()),
            ("limit", "100".to_string()),
            (
                "cayenneExp",
                query::player_games_in_window(
                    &self.config.season_id,
                    self.config.game_type_id,
                    player_id,
                    &window,
                ),
            ),
        ];

        let response = self.skater_summary(&params).await?;
        Ok(SkaterWindowStats::from_games(&response.data))
    }

    async fn goalie_window(&self, player_id: i64, window: StatsWindow) -> Result<GoalieWindowStats> {
        let url = format!("{}/goalie/summary", self.config.stats_base_url);
        let params = [
            ("isAggregate", "false".to_string()),
            ("isGame", "true".to_string()),
            ("start", "0".to_string()),
            ("limit", "100".to_string()),
            (
                "cayenneExp",
                query::player_games_in_window(
                    &self.config.season_id,
                    self.config.game_type_id,
                    player_id,
                    &window,
                ),
            ),
        ];

        let response: ApiResponse<GoalieRecord> = self.get_json(&url, &params).await?;
        Ok(GoalieWindowStats::from_games(&response.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port and return its base URL
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 4096];
            let _ = socket.read(&mut request).await;

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn provider_at(base_url: String) -> NhlStatsProvider {
        let config = StatsProviderConfig {
            stats_base_url: base_url.clone(),
            web_base_url: base_url,
            request_timeout_secs: 5,
            ..Default::default()
        };
        NhlStatsProvider::new(config).unwrap()
    }

    fn window() -> StatsWindow {
        StatsWindow::new(
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 8).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_unknown_team_is_rejected_without_request() {
        // Unroutable base URL: a request attempt would surface as Http, not UnknownTeam
        let config = StatsProviderConfig {
            web_base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let provider = NhlStatsProvider::new(config).unwrap();

        let result = provider.team_games_in_range("XXX", window()).await;
        assert_eq!(result, Err(StatsError::UnknownTeam("XXX".to_string())));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_an_error() {
        let config = StatsProviderConfig {
            stats_base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..Default::default()
        };
        let provider = NhlStatsProvider::new(config).unwrap();

        assert!(provider.skater_window(8478402, window()).await.is_err());
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let provider = provider_at(serve_once("503 Service Unavailable", "{}").await);

        let result = provider.skater_window(8478402, window()).await;
        assert_eq!(result, Err(StatsError::Status { status: 503 }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_reported() {
        let provider = provider_at(serve_once("200 OK", "{\"data\": [oops").await);

        let result = provider.goalie_window(8471679, window()).await;
        assert!(matches!(result, Err(StatsError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_window_totals_from_game_rows() {
        let body = r#"{"data": [
            {"playerId": 8478402, "skaterFullName": "Connor McDavid", "goals": 2, "assists": 1, "points": 3, "plusMinus": 2, "gamesPlayed": 1},
            {"playerId": 8478402, "skaterFullName": "Connor McDavid", "goals": 0, "assists": 2, "points": 2, "plusMinus": -1, "gamesPlayed": 1}
        ], "total": 2}"#;
        let provider = provider_at(serve_once("200 OK", body).await);

        let stats = provider.skater_window(8478402, window()).await.unwrap();
        assert_eq!(stats.goals, 2);
        assert_eq!(stats.assists, 3);
        assert_eq!(stats.plus_minus, 1);
        assert_eq!(stats.games_played, 2);
    }
}
