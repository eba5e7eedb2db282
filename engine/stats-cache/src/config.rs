use serde::{Deserialize, Serialize};
use std::time::Duration;

/// TTL table, one entry per data class
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheTtlConfig {
    /// Weekly leaderboard (6 hours)
    pub top_scorers_secs: u64,

    /// Season roster listing (24 hours)
    pub roster_secs: u64,

    /// Name search results (6 hours)
    pub search_secs: u64,

    /// Team games-in-range counts (6 hours)
    pub team_games_secs: u64,

    /// Per-player window stats read on every standings view (60 seconds)
    pub player_window_secs: u64,
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            top_scorers_secs: 6 * 3600,
            roster_secs: 24 * 3600,
            search_secs: 6 * 3600,
            team_games_secs: 6 * 3600,
            player_window_secs: 60,
        }
    }
}

impl CacheTtlConfig {
    pub fn top_scorers(&self) -> Duration {
        Duration::from_secs(self.top_scorers_secs)
    }

    pub fn roster(&self) -> Duration {
        Duration::from_secs(self.roster_secs)
    }

    pub fn search(&self) -> Duration {
        Duration::from_secs(self.search_secs)
    }

    pub fn team_games(&self) -> Duration {
        Duration::from_secs(self.team_games_secs)
    }

    pub fn player_window(&self) -> Duration {
        Duration::from_secs(self.player_window_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let ttls = [
            ("top_scorers_secs", self.top_scorers_secs),
            ("roster_secs", self.roster_secs),
            ("search_secs", self.search_secs),
            ("team_games_secs", self.team_games_secs),
            ("player_window_secs", self.player_window_secs),
        ];

        for (name, secs) in ttls {
            if secs == 0 {
                return Err(format!("{} must be greater than 0", name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttls() {
        let config = CacheTtlConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.top_scorers(), Duration::from_secs(21600));
        assert_eq!(config.roster(), Duration::from_secs(86400));
        assert_eq!(config.player_window(), Duration::from_secs(60));
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        let config = CacheTtlConfig { search_secs: 0, ..Default::default() };
        assert_eq!(config.validate(), Err("search_secs must be greater than 0".to_string()));
    }
}
