//! Query helpers for inspecting an existing statistics store.

use std::path::Path;

use hs_store::{StatSourceRow, StatsStore, STAT_TABLES};

use crate::error::{AppError, AppResult};
use crate::stats_service::{META_COMPLETED_AT, META_FINGERPRINT};

/// Row counts and job meta for display.
#[derive(Debug, Clone)]
pub struct StoreSummary {
    pub table_counts: Vec<(&'static str, i64)>,
    pub fingerprint: Option<String>,
    pub completed_at: Option<String>,
}

fn open_existing(store_path: &Path) -> AppResult<StatsStore> {
    // Opening creates the database file, so guard against typos here.
    if !store_path.exists() {
        return Err(AppError::InvalidInput(format!(
            "No statistics store at {}",
            store_path.display()
        )));
    }
    Ok(StatsStore::open(store_path)?)
}

/// Summarize a statistics store by table.
pub fn summarize_store(store_path: &Path) -> AppResult<StoreSummary> {
    let store = open_existing(store_path)?;

    let mut table_counts = Vec::with_capacity(STAT_TABLES.len());
    for table in STAT_TABLES {
        table_counts.push((table, store.count_rows(table)?));
    }

    Ok(StoreSummary {
        table_counts,
        fingerprint: store.get_meta(META_FINGERPRINT)?,
        completed_at: store.get_meta(META_COMPLETED_AT)?,
    })
}

/// Load the provenance rows recorded by the last job.
pub fn list_stat_sources(store_path: &Path) -> AppResult<Vec<StatSourceRow>> {
    let store = open_existing(store_path)?;
    Ok(store.load_stat_sources()?)
}
