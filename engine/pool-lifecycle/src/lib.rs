//! Pool Lifecycle
//!
//! A pool moves `selection -> active -> finished` purely as a function of the
//! calendar date. Nothing persists transition events: callers recompute the phase
//! explicitly before reading and write it back only when it changed. Each
//! participant also has an effective phase that can advance early once they mark
//! their selection complete.

pub mod clock;
pub mod error;
pub mod phase;
pub mod pool;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{LifecycleError, Result};
pub use phase::{participant_phase, PoolPhase};
pub use pool::{DraftPick, Membership, NewDraftPick, Pool};
