//! Pool Store
//!
//! Persistence for pools, rule sets, memberships and draft picks. Two backends
//! implement [`PoolStore`]: an in-memory store used by tests and local runs, and
//! a Postgres store. Both make pick insertion atomic: the uniqueness of
//! `(pool, external player)` and the next draft order are decided together with
//! the insert, never in a separate check.

pub mod config;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use memory::InMemoryPoolStore;
pub use postgres::PgPoolStore;
pub use store::{NewMember, NewPool, PoolStore};
