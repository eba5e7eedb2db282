//! Upstream query shaping: sort keys and cayenne filter expressions

use serde::Serialize;

use crate::models::StatsWindow;

#[derive(Debug, Clone, Serialize)]
pub struct SortKey {
    pub property: &'static str,
    pub direction: &'static str,
}

impl SortKey {
    pub const fn desc(property: &'static str) -> Self {
        Self { property, direction: "DESC" }
    }

    pub const fn asc(property: &'static str) -> Self {
        Self { property, direction: "ASC" }
    }
}

/// Leaderboard ordering: points, then goals, then assists
pub const SCORING_SORT: &[SortKey] =
    &[SortKey::desc("points"), SortKey::desc("goals"), SortKey::desc("assists")];

/// Search ordering: points, then goals
pub const SEARCH_SORT: &[SortKey] = &[SortKey::desc("points"), SortKey::desc("goals")];

/// Roster ordering: last name, then first name
pub const ROSTER_SORT: &[SortKey] = &[SortKey::asc("lastName"), SortKey::asc("firstName")];

pub fn sort_param(keys: &[SortKey]) -> String {
    serde_json::to_string(keys).unwrap_or_else(|_| "[]".to_string())
}

/// Per-game filter for every game of the window, all players
pub fn games_in_window(game_type_id: u32, window: &StatsWindow) -> String {
    format!(
        r#"gameTypeId={} and gameDate>="{}" and gameDate<="{}""#,
        game_type_id,
        window.start_str(),
        window.end_str()
    )
}

/// Per-game filter for one player inside the window
pub fn player_games_in_window(
    season_id: &str,
    game_type_id: u32,
    player_id: i64,
    window: &StatsWindow,
) -> String {
    format!(
        r#"seasonId={} and gameTypeId={} and playerId={} and gameDate>="{}" and gameDate<="{}""#,
        season_id,
        game_type_id,
        player_id,
        window.start_str(),
        window.end_str()
    )
}

pub fn season(season_id: &str, game_type_id: u32) -> String {
    format!("seasonId={} and gameTypeId={}", season_id, game_type_id)
}

/// Case-insensitive substring match on the skater's full name
pub fn name_search(season_id: &str, game_type_id: u32, query: &str) -> String {
    format!(
        r#"seasonId={} and gameTypeId={} and skaterFullName likeIgnoreCase "%{}%""#,
        season_id,
        game_type_id,
        sanitize(query)
    )
}

/// Strip characters that would escape the quoted pattern
fn sanitize(query: &str) -> String {
    query.chars().filter(|c| !matches!(c, '"' | '%' | '\\')).collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn window() -> StatsWindow {
        StatsWindow::new(
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 8).unwrap(),
        )
    }

    #[test]
    fn test_player_window_expression() {
        let exp = player_games_in_window("20252026", 2, 8478402, &window());
        assert_eq!(
            exp,
            r#"seasonId=20252026 and gameTypeId=2 and playerId=8478402 and gameDate>="2025-01-02" and gameDate<="2025-01-08""#
        );
    }

    #[test]
    fn test_sort_param_is_json() {
        assert_eq!(
            sort_param(SEARCH_SORT),
            r#"[{"property":"points","direction":"DESC"},{"property":"goals","direction":"DESC"}]"#
        );
    }

    #[test]
    fn test_name_search_strips_quotes() {
        let exp = name_search("20252026", 2, r#"mc"david%"#);
        assert!(exp.ends_with(r#"likeIgnoreCase "%mcdavid%""#));
    }
}
