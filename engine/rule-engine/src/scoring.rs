//! Position-dispatched point computation

use serde::{Deserialize, Serialize};

use crate::position::PositionClass;
use crate::rules::{RuleSet, StatType};

/// Raw window totals for one player, whatever their position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLine {
    pub goals: i64,
    pub assists: i64,
    pub plus_minus: i64,
    pub wins: i64,
    pub shutouts: i64,
    pub games_played: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stat {
    Goals,
    Assists,
    Wins,
    Shutouts,
}

impl Stat {
    fn value(self, line: &StatLine) -> i64 {
        match self {
            Stat::Goals => line.goals,
            Stat::Assists => line.assists,
            Stat::Wins => line.wins,
            Stat::Shutouts => line.shutouts,
        }
    }
}

const SKATER_TERMS: &[(StatType, Stat)] =
    &[(StatType::Goal, Stat::Goals), (StatType::Assist, Stat::Assists)];

const GOALTENDER_TERMS: &[(StatType, Stat)] =
    &[(StatType::Victory, Stat::Wins), (StatType::Shutout, Stat::Shutouts)];

fn terms(class: PositionClass) -> &'static [(StatType, Stat)] {
    match class {
        PositionClass::Skater => SKATER_TERMS,
        PositionClass::Goaltender => GOALTENDER_TERMS,
    }
}

/// Stats retained for display plus the computed points
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickScore {
    pub goals: i64,
    pub assists: i64,
    pub plus_minus: i64,
    pub wins: i64,
    pub shutouts: i64,
    pub games_played: i64,
    pub points: i64,
}

pub struct RuleEngine<'a> {
    rules: &'a RuleSet,
}

impl<'a> RuleEngine<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        self.rules
    }

    /// Score one player's window. Goaltenders never carry goals, assists or
    /// plus/minus; skaters never carry wins or shutouts.
    pub fn score(&self, class: PositionClass, line: &StatLine) -> PickScore {
        let points = terms(class)
            .iter()
            .map(|(stat_type, stat)| self.rules.weight(*stat_type) * stat.value(line))
            .sum();

        match class {
            PositionClass::Skater => PickScore {
                goals: line.goals,
                assists: line.assists,
                plus_minus: line.plus_minus,
                games_played: line.games_played,
                points,
                ..Default::default()
            },
            PositionClass::Goaltender => PickScore {
                wins: line.wins,
                shutouts: line.shutouts,
                games_played: line.games_played,
                points,
                ..Default::default()
            },
        }
    }

    pub fn score_code(&self, position: &str, line: &StatLine) -> PickScore {
        self.score(PositionClass::of_code(position), line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{PlayerLimits, ScoringRule};

    fn rules() -> RuleSet {
        RuleSet {
            id: 1,
            name: "Standard".to_string(),
            scoring_rules: vec![
                ScoringRule::new(StatType::Goal, "Goal", 2),
                ScoringRule::new(StatType::Assist, "Assist", 1),
                ScoringRule::new(StatType::Victory, "Win", 2),
                ScoringRule::new(StatType::Shutout, "Shutout", 3),
                ScoringRule::new(StatType::Defeat, "Loss", 5),
            ],
            player_limits: PlayerLimits::default(),
        }
    }

    #[test]
    fn test_skater_points() {
        let rules = rules();
        let engine = RuleEngine::new(&rules);
        let line = StatLine { goals: 3, assists: 4, plus_minus: 2, wins: 9, ..Default::default() };

        let score = engine.score(PositionClass::Skater, &line);
        assert_eq!(score.points, 3 * 2 + 4);
        assert_eq!(score.wins, 0);
        assert_eq!(score.plus_minus, 2);
    }

    #[test]
    fn test_goaltender_ignores_goals_and_assists() {
        let rules = rules();
        let engine = RuleEngine::new(&rules);
        let line = StatLine { goals: 1, assists: 2, wins: 2, shutouts: 1, ..Default::default() };

        let score = engine.score_code("G", &line);
        assert_eq!(score.points, 2 * 2 + 3);
        assert_eq!(score.goals, 0);
        assert_eq!(score.assists, 0);
    }

    #[test]
    fn test_score_is_deterministic() {
        let rules = rules();
        let engine = RuleEngine::new(&rules);
        let line = StatLine { goals: 5, assists: 1, ..Default::default() };

        assert_eq!(engine.score_code("C", &line), engine.score_code("C", &line));
    }

    #[test]
    fn test_no_rules_scores_zero() {
        let rules = RuleSet { scoring_rules: vec![], ..rules() };
        let engine = RuleEngine::new(&rules);
        let line = StatLine { goals: 5, assists: 5, wins: 5, shutouts: 5, ..Default::default() };

        assert_eq!(engine.score_code("C", &line).points, 0);
        assert_eq!(engine.score_code("G", &line).points, 0);
    }
}
