//! SQLite-backed statistics store.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::rows::{
    FlowlineStatsRow, ManholeStatsRow, PipeStatsRow, PumpStatsRow, StatSourceRow, WeirStatsRow,
};
use crate::{StoreError, StoreResult};

/// The statistics tables, in the order the run writes them.
pub const STAT_TABLES: [&str; 6] = [
    "manhole_stats",
    "flowline_stats",
    "pipe_stats",
    "weir_stats",
    "pump_stats",
    "stat_source",
];

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS manhole_stats (
    id INTEGER PRIMARY KEY,
    code TEXT NOT NULL,
    display_name TEXT NOT NULL,
    sewerage_type INTEGER,
    bottom_level REAL,
    surface_level REAL,
    duration_water_on_surface REAL,
    max_waterlevel REAL,
    end_waterlevel REAL,
    max_waterdepth_surface REAL,
    max_filling REAL,
    end_filling REAL
);
CREATE TABLE IF NOT EXISTS flowline_stats (
    id INTEGER PRIMARY KEY,
    cum_discharge REAL,
    cum_discharge_positive REAL,
    cum_discharge_negative REAL,
    max_discharge REAL,
    end_discharge REAL,
    max_velocity REAL,
    end_velocity REAL,
    max_waterlevel_head REAL,
    max_waterlevel_start REAL,
    max_waterlevel_end REAL,
    end_waterlevel_start REAL,
    end_waterlevel_end REAL,
    abs_length REAL
);
CREATE TABLE IF NOT EXISTS pipe_stats (
    id INTEGER PRIMARY KEY,
    code TEXT NOT NULL,
    display_name TEXT NOT NULL,
    sewerage_type INTEGER,
    invert_level_start REAL,
    invert_level_end REAL,
    profile_height REAL,
    max_hydro_gradient REAL,
    max_filling REAL,
    end_filling REAL
);
CREATE TABLE IF NOT EXISTS weir_stats (
    id INTEGER PRIMARY KEY,
    code TEXT NOT NULL,
    display_name TEXT NOT NULL,
    crest_level REAL,
    perc_volume REAL,
    perc_volume_positive REAL,
    perc_volume_negative REAL,
    max_overfall_height REAL
);
CREATE TABLE IF NOT EXISTS pump_stats (
    id INTEGER PRIMARY KEY,
    model_id INTEGER NOT NULL,
    code TEXT NOT NULL,
    display_name TEXT NOT NULL,
    capacity REAL,
    cum_discharge REAL,
    end_discharge REAL,
    max_discharge REAL,
    duration_at_capacity REAL,
    perc_max_discharge REAL,
    perc_end_discharge REAL
);
CREATE TABLE IF NOT EXISTS stat_source (
    table_name TEXT NOT NULL,
    field_name TEXT NOT NULL,
    input_param TEXT NOT NULL,
    from_aggregate INTEGER NOT NULL,
    timestep REAL,
    PRIMARY KEY (table_name, field_name)
);
CREATE TABLE IF NOT EXISTS stats_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

pub struct StatsStore {
    conn: Connection,
}

impl StatsStore {
    /// Opens (or creates) the statistics database at `path`.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let store = Self { conn };
        store.create_tables()?;
        Ok(store)
    }

    /// Opens an in-memory database (used in tests).
    pub fn open_in_memory() -> StoreResult<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.create_tables()?;
        Ok(store)
    }

    fn create_tables(&self) -> StoreResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ── Base table replacement ─────────────────────────────────

    pub fn replace_manhole_stats(&mut self, rows: &[ManholeStatsRow]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM manhole_stats", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO manhole_stats (
                    id, code, display_name, sewerage_type, bottom_level, surface_level,
                    duration_water_on_surface, max_waterlevel, end_waterlevel,
                    max_waterdepth_surface, max_filling, end_filling
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.id,
                    row.code,
                    row.display_name,
                    row.sewerage_type,
                    row.bottom_level,
                    row.surface_level,
                    row.duration_water_on_surface,
                    row.max_waterlevel,
                    row.end_waterlevel,
                    row.max_waterdepth_surface,
                    row.max_filling,
                    row.end_filling,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn replace_flowline_stats(&mut self, rows: &[FlowlineStatsRow]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM flowline_stats", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO flowline_stats (
                    id, cum_discharge, cum_discharge_positive, cum_discharge_negative,
                    max_discharge, end_discharge, max_velocity, end_velocity,
                    max_waterlevel_head, max_waterlevel_start, max_waterlevel_end,
                    end_waterlevel_start, end_waterlevel_end, abs_length
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.id,
                    row.cum_discharge,
                    row.cum_discharge_positive,
                    row.cum_discharge_negative,
                    row.max_discharge,
                    row.end_discharge,
                    row.max_velocity,
                    row.end_velocity,
                    row.max_waterlevel_head,
                    row.max_waterlevel_start,
                    row.max_waterlevel_end,
                    row.end_waterlevel_start,
                    row.end_waterlevel_end,
                    row.abs_length,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn replace_pipe_stats(&mut self, rows: &[PipeStatsRow]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM pipe_stats", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO pipe_stats (
                    id, code, display_name, sewerage_type, invert_level_start,
                    invert_level_end, profile_height, max_hydro_gradient,
                    max_filling, end_filling
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.id,
                    row.code,
                    row.display_name,
                    row.sewerage_type,
                    row.invert_level_start,
                    row.invert_level_end,
                    row.profile_height,
                    row.max_hydro_gradient,
                    row.max_filling,
                    row.end_filling,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn replace_weir_stats(&mut self, rows: &[WeirStatsRow]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM weir_stats", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO weir_stats (
                    id, code, display_name, crest_level, perc_volume,
                    perc_volume_positive, perc_volume_negative, max_overfall_height
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.id,
                    row.code,
                    row.display_name,
                    row.crest_level,
                    row.perc_volume,
                    row.perc_volume_positive,
                    row.perc_volume_negative,
                    row.max_overfall_height,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn replace_pump_stats(&mut self, rows: &[PumpStatsRow]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM pump_stats", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO pump_stats (
                    id, model_id, code, display_name, capacity, cum_discharge,
                    end_discharge, max_discharge, duration_at_capacity,
                    perc_max_discharge, perc_end_discharge
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.id,
                    row.model_id,
                    row.code,
                    row.display_name,
                    row.capacity,
                    row.cum_discharge,
                    row.end_discharge,
                    row.max_discharge,
                    row.duration_at_capacity,
                    row.perc_max_discharge,
                    row.perc_end_discharge,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    // ── Readback ───────────────────────────────────────────────

    pub fn load_manhole_stats(&self) -> StoreResult<Vec<ManholeStatsRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, code, display_name, sewerage_type, bottom_level, surface_level,
                    duration_water_on_surface, max_waterlevel, end_waterlevel,
                    max_waterdepth_surface, max_filling, end_filling
             FROM manhole_stats ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ManholeStatsRow {
                    id: row.get(0)?,
                    code: row.get(1)?,
                    display_name: row.get(2)?,
                    sewerage_type: row.get(3)?,
                    bottom_level: row.get(4)?,
                    surface_level: row.get(5)?,
                    duration_water_on_surface: row.get(6)?,
                    max_waterlevel: row.get(7)?,
                    end_waterlevel: row.get(8)?,
                    max_waterdepth_surface: row.get(9)?,
                    max_filling: row.get(10)?,
                    end_filling: row.get(11)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn load_flowline_stats(&self) -> StoreResult<Vec<FlowlineStatsRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, cum_discharge, cum_discharge_positive, cum_discharge_negative,
                    max_discharge, end_discharge, max_velocity, end_velocity,
                    max_waterlevel_head, max_waterlevel_start, max_waterlevel_end,
                    end_waterlevel_start, end_waterlevel_end, abs_length
             FROM flowline_stats ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(FlowlineStatsRow {
                    id: row.get(0)?,
                    cum_discharge: row.get(1)?,
                    cum_discharge_positive: row.get(2)?,
                    cum_discharge_negative: row.get(3)?,
                    max_discharge: row.get(4)?,
                    end_discharge: row.get(5)?,
                    max_velocity: row.get(6)?,
                    end_velocity: row.get(7)?,
                    max_waterlevel_head: row.get(8)?,
                    max_waterlevel_start: row.get(9)?,
                    max_waterlevel_end: row.get(10)?,
                    end_waterlevel_start: row.get(11)?,
                    end_waterlevel_end: row.get(12)?,
                    abs_length: row.get(13)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn load_pipe_stats(&self) -> StoreResult<Vec<PipeStatsRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, code, display_name, sewerage_type, invert_level_start,
                    invert_level_end, profile_height, max_hydro_gradient,
                    max_filling, end_filling
             FROM pipe_stats ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(PipeStatsRow {
                    id: row.get(0)?,
                    code: row.get(1)?,
                    display_name: row.get(2)?,
                    sewerage_type: row.get(3)?,
                    invert_level_start: row.get(4)?,
                    invert_level_end: row.get(5)?,
                    profile_height: row.get(6)?,
                    max_hydro_gradient: row.get(7)?,
                    max_filling: row.get(8)?,
                    end_filling: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn load_weir_stats(&self) -> StoreResult<Vec<WeirStatsRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, code, display_name, crest_level, perc_volume,
                    perc_volume_positive, perc_volume_negative, max_overfall_height
             FROM weir_stats ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(WeirStatsRow {
                    id: row.get(0)?,
                    code: row.get(1)?,
                    display_name: row.get(2)?,
                    crest_level: row.get(3)?,
                    perc_volume: row.get(4)?,
                    perc_volume_positive: row.get(5)?,
                    perc_volume_negative: row.get(6)?,
                    max_overfall_height: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn load_pump_stats(&self) -> StoreResult<Vec<PumpStatsRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, model_id, code, display_name, capacity, cum_discharge,
                    end_discharge, max_discharge, duration_at_capacity,
                    perc_max_discharge, perc_end_discharge
             FROM pump_stats ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(PumpStatsRow {
                    id: row.get(0)?,
                    model_id: row.get(1)?,
                    code: row.get(2)?,
                    display_name: row.get(3)?,
                    capacity: row.get(4)?,
                    cum_discharge: row.get(5)?,
                    end_discharge: row.get(6)?,
                    max_discharge: row.get(7)?,
                    duration_at_capacity: row.get(8)?,
                    perc_max_discharge: row.get(9)?,
                    perc_end_discharge: row.get(10)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ── Derived back-fill ──────────────────────────────────────

    /// Writes the gradient and filling fields of already-inserted pipe
    /// rows, all inside one transaction.
    pub fn update_pipe_derived(&mut self, rows: &[PipeStatsRow]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "UPDATE pipe_stats
                 SET max_hydro_gradient = ?1, max_filling = ?2, end_filling = ?3
                 WHERE id = ?4",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.max_hydro_gradient,
                    row.max_filling,
                    row.end_filling,
                    row.id,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Writes the percentage and overfall fields of already-inserted weir
    /// rows, all inside one transaction.
    pub fn update_weir_derived(&mut self, rows: &[WeirStatsRow]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "UPDATE weir_stats
                 SET perc_volume = ?1, perc_volume_positive = ?2,
                     perc_volume_negative = ?3, max_overfall_height = ?4
                 WHERE id = ?5",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.perc_volume,
                    row.perc_volume_positive,
                    row.perc_volume_negative,
                    row.max_overfall_height,
                    row.id,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    // ── Provenance ─────────────────────────────────────────────

    pub fn upsert_stat_sources(&mut self, rows: &[StatSourceRow]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO stat_source (table_name, field_name, input_param, from_aggregate, timestep)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(table_name, field_name) DO UPDATE SET
                    input_param = excluded.input_param,
                    from_aggregate = excluded.from_aggregate,
                    timestep = excluded.timestep",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.table_name,
                    row.field_name,
                    row.input_param,
                    row.from_aggregate,
                    row.timestep,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn load_stat_sources(&self) -> StoreResult<Vec<StatSourceRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT table_name, field_name, input_param, from_aggregate, timestep
             FROM stat_source ORDER BY table_name, field_name",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(StatSourceRow {
                    table_name: row.get(0)?,
                    field_name: row.get(1)?,
                    input_param: row.get(2)?,
                    from_aggregate: row.get(3)?,
                    timestep: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ── Meta ───────────────────────────────────────────────────

    pub fn get_meta(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM stats_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_meta(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO stats_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Row count of one statistics table. Only the names in
    /// [`STAT_TABLES`] are accepted.
    pub fn count_rows(&self, table: &str) -> StoreResult<i64> {
        if !STAT_TABLES.contains(&table) {
            return Err(StoreError::Invalid {
                what: format!("unknown statistics table: {table}"),
            });
        }
        let count = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_rows_rejects_unknown_tables() {
        let store = StatsStore::open_in_memory().unwrap();
        assert!(matches!(
            store.count_rows("sqlite_master"),
            Err(StoreError::Invalid { .. })
        ));
        assert_eq!(store.count_rows("manhole_stats").unwrap(), 0);
    }

    #[test]
    fn meta_upsert_overwrites() {
        let store = StatsStore::open_in_memory().unwrap();
        assert_eq!(store.get_meta("fingerprint").unwrap(), None);
        store.set_meta("fingerprint", "abc").unwrap();
        store.set_meta("fingerprint", "def").unwrap();
        assert_eq!(store.get_meta("fingerprint").unwrap(), Some("def".to_string()));
    }
}
