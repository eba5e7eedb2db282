use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RuleError;

/// Roster position of a drafted player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Center,
    LeftWing,
    RightWing,
    Defense,
    Goaltender,
}

/// Selects which scoring formula applies to a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionClass {
    Skater,
    Goaltender,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::Center,
        Position::LeftWing,
        Position::RightWing,
        Position::Defense,
        Position::Goaltender,
    ];

    /// Canonical single-letter code as reported upstream
    pub fn code(&self) -> &'static str {
        match self {
            Position::Center => "C",
            Position::LeftWing => "L",
            Position::RightWing => "R",
            Position::Defense => "D",
            Position::Goaltender => "G",
        }
    }

    pub fn class(&self) -> PositionClass {
        match self {
            Position::Goaltender => PositionClass::Goaltender,
            _ => PositionClass::Skater,
        }
    }
}

impl PositionClass {
    /// Class of a stored position code. Only `G` scores as a goaltender;
    /// anything else, including codes we cannot parse, scores as a skater.
    pub fn of_code(code: &str) -> Self {
        match code.parse::<Position>() {
            Ok(position) => position.class(),
            Err(_) => PositionClass::Skater,
        }
    }
}

/// Canonical form of a stored position code, so `LW`, `l` and `L` compare equal.
/// Codes outside the enum are only trimmed and upper-cased.
pub fn canonical_code(code: &str) -> String {
    code.parse::<Position>()
        .map(|position| position.code().to_string())
        .unwrap_or_else(|_| code.trim().to_uppercase())
}

impl FromStr for Position {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "C" => Ok(Position::Center),
            "L" | "LW" | "AG" => Ok(Position::LeftWing),
            "R" | "RW" | "AD" => Ok(Position::RightWing),
            "D" => Ok(Position::Defense),
            "G" => Ok(Position::Goaltender),
            _ => Err(RuleError::UnknownPosition(s.to_string())),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
