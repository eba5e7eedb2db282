use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::teams;

/// Date format used by the upstream query language
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive date range used to select games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatsWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl StatsWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Monday to Sunday week containing `day`
    pub fn week_of(day: NaiveDate) -> Self {
        let start = day - Duration::days(day.weekday().num_days_from_monday() as i64);
        Self { start, end: start + Duration::days(6) }
    }

    /// Inclusive on both bounds
    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }

    pub fn start_str(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

/// Upstream list wrapper: `{"data": [...], "total": n}`
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,

    #[serde(default)]
    pub total: u64,
}

/// Skater summary record (one per game when `isGame=true`, one per season otherwise)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkaterRecord {
    pub player_id: i64,
    pub skater_full_name: Option<String>,
    pub position_code: Option<String>,
    pub team_abbrev: Option<String>,
    pub team_abbrevs: Option<String>,
    pub goals: i64,
    pub assists: i64,
    pub points: i64,
    pub games_played: i64,
    pub plus_minus: i64,
    pub penalty_minutes: i64,
    pub shots: i64,
    pub shooting_pct: Option<f64>,
    pub game_date: Option<String>,
}

/// Goalie summary record, one per game appearance
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoalieRecord {
    pub player_id: i64,
    pub goalie_full_name: Option<String>,
    pub wins: i64,
    pub shutouts: i64,
    pub games_played: i64,
    pub losses: i64,
    pub ot_losses: i64,
}

/// Club schedule payload: `{"games": [...]}`
#[derive(Debug, Default, Deserialize)]
pub struct ScheduleResponse {
    #[serde(default)]
    pub games: Vec<ScheduledGame>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledGame {
    pub game_date: Option<String>,
}

impl ScheduledGame {
    /// Date-only portion of `gameDate`, ignoring any time component
    pub fn date(&self) -> Option<NaiveDate> {
        let raw = self.game_date.as_deref()?;
        let date_part = raw.get(..10)?;
        NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
    }
}

/// Player row shown in leaderboards, listings and search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub position: String,
    pub team_abbrev: String,
    pub team_name: String,
    pub points: i64,
    pub goals: i64,
    pub assists: i64,
    pub games_played: i64,
    pub plus_minus: i64,
    pub penalty_minutes: i64,
    pub shots: i64,
    pub shooting_pct: f64,
    pub headshot_url: String,
}

impl PlayerSummary {
    /// Map a skater record, taking the team from `teamAbbrev` (game rows)
    /// or `teamAbbrevs` (season rows).
    pub fn from_record(record: &SkaterRecord, season_id: &str) -> Self {
        let full_name = record.skater_full_name.clone().unwrap_or_default();
        let (first_name, last_name) = split_name(&full_name);
        let team_abbrev = record
            .team_abbrev
            .clone()
            .or_else(|| record.team_abbrevs.clone())
            .unwrap_or_default();

        Self {
            id: record.player_id,
            first_name,
            last_name,
            full_name,
            position: record.position_code.clone().unwrap_or_default(),
            team_name: teams::full_name(&team_abbrev),
            headshot_url: teams::headshot_url(season_id, record.player_id, &team_abbrev),
            team_abbrev,
            points: record.points,
            goals: record.goals,
            assists: record.assists,
            games_played: record.games_played,
            plus_minus: record.plus_minus,
            penalty_minutes: record.penalty_minutes,
            shots: record.shots,
            shooting_pct: record.shooting_pct.unwrap_or(0.0),
        }
    }
}

/// A page of player rows plus the upstream total count
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerPage {
    pub data: Vec<PlayerSummary>,
    pub total: u64,
}

/// Skater totals over a window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkaterWindowStats {
    pub goals: i64,
    pub assists: i64,
    pub points: i64,
    pub games_played: i64,
    pub plus_minus: i64,
}

impl SkaterWindowStats {
    /// Sum per-game records; games played is the number of game rows.
    pub fn from_games(games: &[SkaterRecord]) -> Self {
        games.iter().fold(
            Self { games_played: games.len() as i64, ..Default::default() },
            |mut acc, game| {
                acc.goals += game.goals;
                acc.assists += game.assists;
                acc.points += game.points;
                acc.plus_minus += game.plus_minus;
                acc
            },
        )
    }
}

/// Goaltender totals over a window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalieWindowStats {
    pub wins: i64,
    pub shutouts: i64,
    pub games_played: i64,
}

impl GoalieWindowStats {
    pub fn from_games(games: &[GoalieRecord]) -> Self {
        games.iter().fold(
            Self { games_played: games.len() as i64, ..Default::default() },
            |mut acc, game| {
                acc.wins += game.wins;
                acc.shutouts += game.shutouts;
                acc
            },
        )
    }
}

/// "Connor McDavid" -> ("Connor", "McDavid"); a single token is used for both.
fn split_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.split(' ');
    let first = parts.next().unwrap_or_default().to_string();
    let rest: Vec<&str> = parts.collect();
    let last = if rest.is_empty() { first.clone() } else { rest.join(" ") };
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_week_of_starts_on_monday() {
        // 2025-01-08 is a Wednesday
        let week = StatsWindow::week_of(date("2025-01-08"));
        assert_eq!(week.start, date("2025-01-06"));
        assert_eq!(week.end, date("2025-01-12"));

        let week = StatsWindow::week_of(date("2025-01-06"));
        assert_eq!(week.start, date("2025-01-06"));
    }

    #[test]
    fn test_skater_games_are_summed() {
        let payload = json!({
            "data": [
                {"playerId": 8478402, "goals": 2, "assists": 1, "points": 3, "plusMinus": 2},
                {"playerId": 8478402, "goals": 0, "assists": 2, "points": 2, "plusMinus": -1},
                {"playerId": 8478402, "goals": 1, "assists": 0, "points": 1, "plusMinus": 0}
            ],
            "total": 3
        });
        let response: ApiResponse<SkaterRecord> = serde_json::from_value(payload).unwrap();
        let stats = SkaterWindowStats::from_games(&response.data);

        assert_eq!(stats.goals, 3);
        assert_eq!(stats.assists, 3);
        assert_eq!(stats.points, 6);
        assert_eq!(stats.plus_minus, 1);
        assert_eq!(stats.games_played, 3);
    }

    #[test]
    fn test_goalie_games_are_summed_per_appearance() {
        let payload = json!({
            "data": [
                {"playerId": 8475883, "wins": 1, "shutouts": 1},
                {"playerId": 8475883, "wins": 0, "shutouts": 0, "losses": 1},
                {"playerId": 8475883, "wins": 1, "shutouts": 0}
            ]
        });
        let response: ApiResponse<GoalieRecord> = serde_json::from_value(payload).unwrap();
        let stats = GoalieWindowStats::from_games(&response.data);

        assert_eq!(stats, GoalieWindowStats { wins: 2, shutouts: 1, games_played: 3 });
    }

    #[test]
    fn test_missing_data_array_is_empty() {
        let response: ApiResponse<SkaterRecord> = serde_json::from_value(json!({})).unwrap();
        assert!(response.data.is_empty());
        assert_eq!(SkaterWindowStats::from_games(&response.data), SkaterWindowStats::default());
    }

    #[test]
    fn test_schedule_date_uses_date_prefix() {
        let game = ScheduledGame { game_date: Some("2025-01-02T00:00:00Z".to_string()) };
        assert_eq!(game.date(), Some(date("2025-01-02")));

        let game = ScheduledGame { game_date: Some("bad".to_string()) };
        assert_eq!(game.date(), None);
    }

    #[test]
    fn test_player_summary_mapping() {
        let record = SkaterRecord {
            player_id: 8478402,
            skater_full_name: Some("Connor McDavid".to_string()),
            position_code: Some("C".to_string()),
            team_abbrevs: Some("EDM".to_string()),
            goals: 40,
            assists: 60,
            points: 100,
            ..Default::default()
        };
        let summary = PlayerSummary::from_record(&record, "20252026");

        assert_eq!(summary.first_name, "Connor");
        assert_eq!(summary.last_name, "McDavid");
        assert_eq!(summary.team_abbrev, "EDM");
        assert_eq!(summary.team_name, "Edmonton Oilers");
        assert_eq!(summary.headshot_url, "https://assets.nhle.com/mugs/nhl/20252026/EDM/8478402.png");
    }

    #[test]
    fn test_single_token_name() {
        assert_eq!(split_name("Zeus"), ("Zeus".to_string(), "Zeus".to_string()));
        assert_eq!(
            split_name("Jesperi Kotkaniemi Jr"),
            ("Jesperi".to_string(), "Kotkaniemi Jr".to_string())
        );
    }
}
