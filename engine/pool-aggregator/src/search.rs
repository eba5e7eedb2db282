use serde::{Deserialize, Serialize};
use stats_provider::PlayerSummary;

/// Shortest query that is sent upstream
pub const MIN_QUERY_LEN: usize = 2;

/// Search hit annotated with its availability in one pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolPlayerSearchResult {
    #[serde(flatten)]
    pub player: PlayerSummary,
    pub games_in_pool: u32,
    pub is_available: bool,
    pub selected_by: Option<String>,
}

/// True when a query is long enough to search for
pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_queries_are_not_searchable() {
        assert!(!is_searchable(""));
        assert!(!is_searchable(" m "));
        assert!(is_searchable("mc"));
        assert!(is_searchable("Élie"));
    }
}
