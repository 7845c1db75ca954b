//! hs-store: SQLite persistence for network statistics.
//!
//! Only this crate talks to the database. One [`StatsStore`] owns the
//! connection; every table replacement, derived-field update and
//! provenance upsert runs inside its own transaction so a failed run
//! never leaves a table half-written.

pub mod rows;
pub mod store;

pub use rows::*;
pub use store::{StatsStore, STAT_TABLES};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid store request: {what}")]
    Invalid { what: String },
}
