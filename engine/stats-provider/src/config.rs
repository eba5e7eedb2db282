use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the NHL stats client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsProviderConfig {
    /// Base URL of the stats REST API (skater/goalie summaries)
    pub stats_base_url: String,

    /// Base URL of the web API (club schedules)
    pub web_base_url: String,

    /// Season identifier, e.g. "20252026"
    pub season_id: String,

    /// Game type filter (2 = regular season)
    pub game_type_id: u32,

    /// Upper bound on a single upstream request
    pub request_timeout_secs: u64,
}

impl Default for StatsProviderConfig {
    fn default() -> Self {
        Self {
            stats_base_url: "https://api.nhle.com/stats/rest/en".to_string(),
            web_base_url: "https://api-web.nhle.com/v1".to_string(),
            season_id: "20252026".to_string(),
            game_type_id: 2,
            request_timeout_secs: 10,
        }
    }
}

impl StatsProviderConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("NHL_STATS_BASE_URL") {
            config.stats_base_url = url;
        }

        if let Ok(url) = std::env::var("NHL_WEB_BASE_URL") {
            config.web_base_url = url;
        }

        if let Ok(season) = std::env::var("NHL_SEASON_ID") {
            config.season_id = season;
        }

        if let Ok(timeout) = std::env::var("NHL_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout.parse().unwrap_or(10);
        }

        config
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }

        if self.season_id.len() != 8 || !self.season_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("Invalid season id: {}", self.season_id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = StatsProviderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_rejects_bad_season_and_timeout() {
        let config = StatsProviderConfig { season_id: "2025".to_string(), ..Default::default() };
        assert!(config.validate().is_err());

        let config = StatsProviderConfig { request_timeout_secs: 0, ..Default::default() };
        assert!(config.validate().is_err());
    }
}
