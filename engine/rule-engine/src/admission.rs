//! Draft-pick admission and ordering

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{Result, RuleError};
use crate::position::{canonical_code, Position};
use crate::rules::RuleSet;

/// What admission needs to know about a pick already in the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingPick {
    pub participant_id: i64,
    pub external_player_id: i64,
    pub position: String,
    pub draft_order: i32,
    /// Display name of the participant who made the pick
    pub drafted_by: String,
}

/// Decide whether `participant_id` may draft `external_player_id` at `position`.
/// A player already in the pool is reported as a duplicate before the position
/// is looked at.
pub fn can_add_pick(
    rules: &RuleSet,
    picks: &[ExistingPick],
    participant_id: i64,
    position: &str,
    external_player_id: i64,
) -> Result<()> {
    if let Some(existing) = picks.iter().find(|pick| pick.external_player_id == external_player_id)
    {
        return Err(RuleError::DuplicatePick {
            external_player_id,
            drafted_by: existing.drafted_by.clone(),
        });
    }

    let position: Position = position.parse()?;

    if let Some(limit) = rules.position_limit(position.code()) {
        let held = picks
            .iter()
            .filter(|pick| {
                pick.participant_id == participant_id && canonical_code(&pick.position) == position.code()
            })
            .count() as u32;

        if held >= limit {
            debug!(
                "Participant {} holds {} of {} allowed at {}",
                participant_id, held, limit, position
            );
            return Err(RuleError::PositionLimitExceeded {
                position: position.code().to_string(),
                limit,
            });
        }
    }

    Ok(())
}

/// `max(draft_order) + 1`, or 1 for an empty pool
pub fn next_draft_order(picks: &[ExistingPick]) -> i32 {
    picks.iter().map(|pick| pick.draft_order).max().unwrap_or(0) + 1
}

/// Per-position pick counts for one participant, for every requested position
pub fn position_counts(
    picks: &[ExistingPick],
    participant_id: i64,
    positions: &[String],
) -> BTreeMap<String, u32> {
    let mut counts: BTreeMap<String, u32> =
        positions.iter().map(|position| (canonical_code(position), 0)).collect();

    for pick in picks.iter().filter(|pick| pick.participant_id == participant_id) {
        if let Some(count) = counts.get_mut(&canonical_code(&pick.position)) {
            *count += 1;
        }
    }

    counts
}
