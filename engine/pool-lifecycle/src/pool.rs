//! Pool, membership and draft pick records

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LifecycleError, Result};
use crate::phase::{participant_phase, PoolPhase};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: i64,
    pub name: String,
    /// Draft day; scoring starts the day after
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub draft_start_date: Option<NaiveDate>,
    pub draft_end_date: Option<NaiveDate>,
    pub rule_set_id: i64,
    pub owner_id: i64,
    /// Last computed phase; authoritative only after `recompute`
    pub status: PoolPhase,
}

impl Pool {
    /// Check the date range of a pool about to be created
    pub fn validate_dates(start: NaiveDate, end: NaiveDate) -> Result<()> {
        if start >= end {
            return Err(LifecycleError::InvalidDateRange { start, end });
        }
        Ok(())
    }

    pub fn phase_on(&self, today: NaiveDate) -> PoolPhase {
        PoolPhase::on(today, self.start_date, self.end_date)
    }

    /// Bring `status` in line with `today`. Returns true when it changed and
    /// must be written back.
    pub fn recompute(&mut self, today: NaiveDate) -> bool {
        let phase = self.phase_on(today);
        if phase == self.status {
            return false;
        }

        debug!("Pool {} moves from {} to {}", self.id, self.status, phase);
        self.status = phase;
        true
    }

    /// Inclusive date range over which picks score: the draft day is excluded
    pub fn scoring_window(&self) -> (NaiveDate, NaiveDate) {
        (self.start_date + Duration::days(1), self.end_date)
    }
}

/// A user's participation in a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub pool_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub selection_completed_at: Option<DateTime<Utc>>,
}

impl Membership {
    pub fn phase(&self, pool: &Pool, today: NaiveDate) -> PoolPhase {
        participant_phase(today, pool.start_date, self.selection_completed_at)
    }
}

/// A participant's claim on one external player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPick {
    pub id: i64,
    pub pool_id: i64,
    pub participant_id: i64,
    pub external_player_id: i64,
    pub player_name: String,
    pub position: String,
    pub team_code: String,
    pub team_name: Option<String>,
    pub headshot_url: Option<String>,
    pub draft_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Pick as requested by a participant; id and draft order are assigned on insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDraftPick {
    pub pool_id: i64,
    pub participant_id: i64,
    pub external_player_id: i64,
    pub player_name: String,
    pub position: String,
    pub team_code: String,
    pub team_name: Option<String>,
    pub headshot_url: Option<String>,
}
