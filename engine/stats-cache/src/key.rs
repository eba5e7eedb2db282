use std::fmt;

use stats_provider::StatsWindow;

/// Identity of one cached upstream lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatsKey {
    TopScorers { week: StatsWindow, limit: u32 },
    Roster { start: u32, limit: u32 },
    Search { query: String, limit: u32 },
    TeamGames { team: String, window: StatsWindow },
    SkaterWindow { player_id: i64, window: StatsWindow },
    GoalieWindow { player_id: i64, window: StatsWindow },
}

impl StatsKey {
    /// Search keys are case-insensitive
    pub fn search(query: &str, limit: u32) -> Self {
        StatsKey::Search { query: query.trim().to_lowercase(), limit }
    }
}

impl fmt::Display for StatsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsKey::TopScorers { week, limit } => {
                write!(f, "top_scorers:{}:{}:{}", week.start_str(), week.end_str(), limit)
            }
            StatsKey::Roster { start, limit } => write!(f, "roster:{}:{}", start, limit),
            StatsKey::Search { query, limit } => write!(f, "search:{}:{}", query, limit),
            StatsKey::TeamGames { team, window } => {
                write!(f, "team_games:{}:{}:{}", team, window.start_str(), window.end_str())
            }
            StatsKey::SkaterWindow { player_id, window } => {
                write!(f, "skater:{}:{}:{}", player_id, window.start_str(), window.end_str())
            }
            StatsKey::GoalieWindow { player_id, window } => {
                write!(f, "goalie:{}:{}:{}", player_id, window.start_str(), window.end_str())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_key_ignores_case() {
        assert_eq!(StatsKey::search("McDavid", 20), StatsKey::search(" mcdavid", 20));
        assert_ne!(StatsKey::search("mcdavid", 20), StatsKey::search("mcdavid", 10));
        assert_eq!(StatsKey::search("McDavid", 20).to_string(), "search:mcdavid:20");
    }
}
