//! Rule Engine
//!
//! Turns a pool's scoring rule set into point totals and decides whether a draft
//! pick may be admitted. A rule set is resolved once from its stored form, either
//! the structured rule list or the legacy per-stat columns, and everything
//! downstream works on the canonical [`RuleSet`].

pub mod admission;
pub mod error;
pub mod position;
pub mod rules;
pub mod scoring;

pub use admission::{can_add_pick, next_draft_order, position_counts, ExistingPick};
pub use error::{Result, RuleError};
pub use position::{canonical_code, Position, PositionClass};
pub use rules::{PlayerLimits, PositionLimit, RuleSet, RuleSetRecord, ScoringRule, StatType};
pub use scoring::{PickScore, RuleEngine, StatLine};
