use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LifecycleError;

/// Calendar phase of a pool. Ordered: phases only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolPhase {
    Selection,
    Active,
    Finished,
}

impl PoolPhase {
    /// Phase on `today` for a pool drafted on `start` and closing on `end`.
    /// The start date itself is draft day and still belongs to selection.
    pub fn on(today: NaiveDate, start: NaiveDate, end: NaiveDate) -> Self {
        if today > end {
            PoolPhase::Finished
        } else if today > start {
            PoolPhase::Active
        } else {
            PoolPhase::Selection
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PoolPhase::Selection => "selection",
            PoolPhase::Active => "active",
            PoolPhase::Finished => "finished",
        }
    }

    /// Phases that still take part in periodic stats syncs
    pub fn is_live(&self) -> bool {
        matches!(self, PoolPhase::Selection | PoolPhase::Active)
    }
}

/// Effective phase of one participant: `active` once the draft day has passed
/// or once they marked their selection complete, `selection` otherwise.
pub fn participant_phase(
    today: NaiveDate,
    start: NaiveDate,
    selection_completed_at: Option<DateTime<Utc>>,
) -> PoolPhase {
    if today > start || selection_completed_at.is_some() {
        PoolPhase::Active
    } else {
        PoolPhase::Selection
    }
}

impl fmt::Display for PoolPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoolPhase {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "selection" => Ok(PoolPhase::Selection),
            "active" => Ok(PoolPhase::Active),
            "finished" => Ok(PoolPhase::Finished),
            other => Err(LifecycleError::UnknownPhase(other.to_string())),
        }
    }
}
