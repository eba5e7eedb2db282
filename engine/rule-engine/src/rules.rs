//! Scoring rule sets: stored form, resolution and validation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, RuleError};
use crate::position::{canonical_code, Position};

/// Default roster size when a legacy rule set does not set one
pub const DEFAULT_MAX_PER_PARTICIPANT: u32 = 20;

pub const MAX_PER_PARTICIPANT_RANGE: std::ops::RangeInclusive<u32> = 1..=50;
pub const POSITION_LIMIT_RANGE: std::ops::RangeInclusive<u32> = 0..=20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatType {
    Goal,
    Assist,
    Shutout,
    Victory,
    Defeat,
    Overtime,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRule {
    #[serde(rename = "type")]
    pub stat_type: StatType,

    #[serde(default)]
    pub label: String,

    /// Points per occurrence of the stat
    pub points: u32,
}

impl ScoringRule {
    pub fn new(stat_type: StatType, label: &str, points: u32) -> Self {
        Self { stat_type, label: label.to_string(), points }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionLimit {
    #[serde(default)]
    pub min: u32,

    #[serde(default)]
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLimits {
    #[serde(alias = "max_per_user", default = "default_max_per_participant")]
    pub max_per_participant: u32,

    /// Keyed by position code. Resolved rule sets carry canonical codes only.
    #[serde(default)]
    pub by_position: BTreeMap<String, PositionLimit>,
}

fn default_max_per_participant() -> u32 {
    DEFAULT_MAX_PER_PARTICIPANT
}

impl Default for PlayerLimits {
    fn default() -> Self {
        Self { max_per_participant: DEFAULT_MAX_PER_PARTICIPANT, by_position: BTreeMap::new() }
    }
}

/// Structured rule document stored alongside a rule set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicRules {
    #[serde(default)]
    pub scoring_rules: Option<Vec<ScoringRule>>,

    #[serde(default)]
    pub player_limits: Option<PlayerLimits>,
}

/// Rule set as persisted: legacy per-stat columns plus an optional
/// structured document that takes precedence when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetRecord {
    pub id: i64,
    pub name: String,
    pub points_per_goal: i32,
    pub points_per_assist: i32,
    pub points_per_shutout: i32,
    pub points_per_victory: i32,
    pub points_per_defeat: i32,
    pub points_per_overtime: i32,
    pub max_players_per_user: Option<i32>,
    pub position_limits: Option<BTreeMap<String, PositionLimit>>,
    pub rules: Option<DynamicRules>,
}

/// Canonical, immutable rule set. Callers never see where the rules came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub id: i64,
    pub name: String,
    pub scoring_rules: Vec<ScoringRule>,
    pub player_limits: PlayerLimits,
}

impl RuleSet {
    /// Resolve the stored form. Scoring rules and player limits are resolved
    /// independently; neither step can fail.
    pub fn resolve(record: &RuleSetRecord) -> Self {
        let dynamic = record.rules.as_ref();

        let scoring_rules = match dynamic.and_then(|rules| rules.scoring_rules.clone()) {
            Some(rules) => rules,
            None => legacy_scoring_rules(record),
        };

        let player_limits = match dynamic.and_then(|rules| rules.player_limits.clone()) {
            Some(limits) => PlayerLimits {
                max_per_participant: limits.max_per_participant,
                by_position: canonical_limits(&limits.by_position),
            },
            None => PlayerLimits {
                max_per_participant: record
                    .max_players_per_user
                    .and_then(|max| u32::try_from(max).ok())
                    .unwrap_or(DEFAULT_MAX_PER_PARTICIPANT),
                by_position: record
                    .position_limits
                    .as_ref()
                    .map(canonical_limits)
                    .unwrap_or_default(),
            },
        };

        Self { id: record.id, name: record.name.clone(), scoring_rules, player_limits }
    }

    /// Points awarded per occurrence of `stat_type`, summed over every rule of that type
    pub fn weight(&self, stat_type: StatType) -> i64 {
        self.scoring_rules
            .iter()
            .filter(|rule| rule.stat_type == stat_type)
            .map(|rule| rule.points as i64)
            .sum()
    }

    /// Configured maximum for a position code, when one exists and is positive
    pub fn position_limit(&self, position: &str) -> Option<u32> {
        self.player_limits
            .by_position
            .get(&canonical_code(position))
            .map(|limit| limit.max)
            .filter(|max| *max > 0)
    }

    /// Position codes that carry a positive maximum
    pub fn limited_positions(&self) -> Vec<String> {
        self.player_limits
            .by_position
            .iter()
            .filter(|(_, limit)| limit.max > 0)
            .map(|(code, _)| code.clone())
            .collect()
    }

    /// Reject rule sets that cannot be attached to a new pool
    pub fn validate(&self) -> Result<()> {
        if self.scoring_rules.is_empty() {
            return Err(RuleError::invalid_rule_set("at least one scoring rule is required"));
        }

        let max = self.player_limits.max_per_participant;
        if !MAX_PER_PARTICIPANT_RANGE.contains(&max) {
            return Err(RuleError::invalid_rule_set(format!(
                "max_per_participant must be between 1 and 50, got {}",
                max
            )));
        }

        for (position, limit) in &self.player_limits.by_position {
            position.parse::<Position>().map_err(|_| {
                RuleError::invalid_rule_set(format!("unknown position {} in limits", position))
            })?;

            if !POSITION_LIMIT_RANGE.contains(&limit.min) || !POSITION_LIMIT_RANGE.contains(&limit.max)
            {
                return Err(RuleError::invalid_rule_set(format!(
                    "limits for position {} must be between 0 and 20",
                    position
                )));
            }
        }

        Ok(())
    }
}

/// Re-key limits by canonical code. When `L` and `LW` both appear, the
/// tighter positive maximum wins.
fn canonical_limits(limits: &BTreeMap<String, PositionLimit>) -> BTreeMap<String, PositionLimit> {
    let mut canonical: BTreeMap<String, PositionLimit> = BTreeMap::new();

    for (code, limit) in limits {
        canonical
            .entry(canonical_code(code))
            .and_modify(|existing| {
                if existing.max == 0 || (limit.max > 0 && limit.max < existing.max) {
                    *existing = *limit;
                }
            })
            .or_insert(*limit);
    }

    canonical
}

fn legacy_scoring_rules(record: &RuleSetRecord) -> Vec<ScoringRule> {
    let columns = [
        (StatType::Goal, "But", record.points_per_goal),
        (StatType::Assist, "Passe", record.points_per_assist),
        (StatType::Shutout, "Blanchissage", record.points_per_shutout),
        (StatType::Victory, "Victoire", record.points_per_victory),
    ];

    columns
        .into_iter()
        .filter_map(|(stat_type, label, points)| {
            u32::try_from(points)
                .ok()
                .filter(|points| *points > 0)
                .map(|points| ScoringRule::new(stat_type, label, points))
        })
        .collect()
}
