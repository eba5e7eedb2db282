//! Standings view and ranking

use chrono::NaiveDate;
use pool_lifecycle::{DraftPick, Membership, PoolPhase};
use rule_engine::{PickScore, PositionLimit};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedPick {
    pub pick: DraftPick,
    pub drafted_by: String,
    pub score: PickScore,
    /// Games the player's team plays inside the scoring window
    pub games_in_pool: u32,
    pub can_delete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantStanding {
    pub user_id: i64,
    pub name: String,
    /// Skater goals only
    pub total_goals: i64,
    pub total_assists: i64,
    pub total_plus_minus: i64,
    pub total_points: i64,
    pub active_players: u32,
    /// Injury tracking is not available upstream; always 0
    pub injured_players: u32,
    pub is_owner: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    pub pool_id: i64,
    pub pool_name: String,
    pub pool_phase: PoolPhase,
    pub viewer_phase: PoolPhase,
    pub scoring_start: NaiveDate,
    pub scoring_end: NaiveDate,
    pub ranked_picks: Vec<RankedPick>,
    pub ranked_participants: Vec<ParticipantStanding>,
    pub viewer_pick_count: u32,
    pub max_per_participant: u32,
    pub position_limits: BTreeMap<String, PositionLimit>,
    /// Viewer's picks per limited position
    pub position_counts: BTreeMap<String, u32>,
}

/// Sort by points, highest first. The sort is stable, so picks supplied in
/// draft order keep that order among equal scores.
pub fn rank_picks(mut picks: Vec<RankedPick>) -> Vec<RankedPick> {
    picks.sort_by(|a, b| b.score.points.cmp(&a.score.points));
    picks
}

/// Total each member's picks and rank members by points. Members supplied in
/// join order keep it among equal totals.
pub fn rank_participants(
    members: &[Membership],
    picks: &[RankedPick],
    owner_id: i64,
) -> Vec<ParticipantStanding> {
    let mut by_member: HashMap<i64, Vec<&RankedPick>> = HashMap::new();
    for pick in picks {
        by_member.entry(pick.pick.participant_id).or_default().push(pick);
    }

    let mut standings: Vec<ParticipantStanding> = members
        .iter()
        .map(|member| {
            let owned = by_member.get(&member.user_id).map(Vec::as_slice).unwrap_or_default();

            ParticipantStanding {
                user_id: member.user_id,
                name: member.user_name.clone(),
                total_goals: owned.iter().map(|p| p.score.goals).sum(),
                total_assists: owned.iter().map(|p| p.score.assists).sum(),
                total_plus_minus: owned.iter().map(|p| p.score.plus_minus).sum(),
                total_points: owned.iter().map(|p| p.score.points).sum(),
                active_players: owned.len() as u32,
                injured_players: 0,
                is_owner: member.user_id == owner_id,
            }
        })
        .collect();

    standings.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    standings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ranked(id: i64, participant_id: i64, order: i32, points: i64) -> RankedPick {
        RankedPick {
            pick: DraftPick {
                id,
                pool_id: 1,
                participant_id,
                external_player_id: 1000 + id,
                player_name: format!("Player {}", id),
                position: "C".to_string(),
                team_code: "MTL".to_string(),
                team_name: None,
                headshot_url: None,
                draft_order: order,
                created_at: Utc::now(),
            },
            drafted_by: format!("user {}", participant_id),
            score: PickScore { goals: points, points, ..Default::default() },
            games_in_pool: 3,
            can_delete: false,
        }
    }

    fn member(user_id: i64, name: &str) -> Membership {
        Membership {
            pool_id: 1,
            user_id,
            user_name: name.to_string(),
            selection_completed_at: None,
        }
    }

    #[test]
    fn test_ties_keep_draft_order() {
        let picks = vec![ranked(1, 1, 1, 4), ranked(2, 2, 2, 6), ranked(3, 1, 3, 4), ranked(4, 2, 4, 0)];
        let order: Vec<i32> = rank_picks(picks).iter().map(|p| p.pick.draft_order).collect();

        assert_eq!(order, vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_participants_total_their_picks() {
        let picks = vec![ranked(1, 1, 1, 4), ranked(2, 2, 2, 6), ranked(3, 1, 3, 5)];
        let members = vec![member(1, "Alex"), member(2, "Sam"), member(3, "Kim")];

        let standings = rank_participants(&members, &picks, 2);

        assert_eq!(standings[0].name, "Alex");
        assert_eq!(standings[0].total_points, 9);
        assert_eq!(standings[0].active_players, 2);
        assert_eq!(standings[1].name, "Sam");
        assert!(standings[1].is_owner);
        assert_eq!(standings[2].name, "Kim");
        assert_eq!(standings[2].total_points, 0);
        assert_eq!(standings[2].injured_players, 0);
    }

    #[test]
    fn test_participant_ties_keep_join_order() {
        let members = vec![member(5, "Late"), member(2, "Early")];
        let standings = rank_participants(&members, &[], 0);

        assert_eq!(standings[0].user_id, 5);
        assert_eq!(standings[1].user_id, 2);
    }
}
