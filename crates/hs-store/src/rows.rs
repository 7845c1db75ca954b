//! Row types of the statistics tables.
//!
//! Fields that a run may leave undefined (masked inputs, missing model
//! attributes, divisions that would be meaningless) are `Option` and land
//! as SQL NULL, never as zero.

/// One row of `manhole_stats`, keyed by the node's result-store index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ManholeStatsRow {
    pub id: i64,
    pub code: String,
    pub display_name: String,
    pub sewerage_type: Option<i64>,
    pub bottom_level: Option<f64>,
    pub surface_level: Option<f64>,
    /// Hours the water level spent at or above the surface level.
    pub duration_water_on_surface: Option<f64>,
    pub max_waterlevel: Option<f64>,
    pub end_waterlevel: Option<f64>,
    /// Highest water level minus surface level; negative when the water
    /// never reached the surface.
    pub max_waterdepth_surface: Option<f64>,
    pub max_filling: Option<f64>,
    pub end_filling: Option<f64>,
}

/// One row of `flowline_stats`, keyed by the flowline's result-store
/// index. Covers every flowline, not only pipes and weirs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowlineStatsRow {
    pub id: i64,
    pub cum_discharge: Option<f64>,
    pub cum_discharge_positive: Option<f64>,
    pub cum_discharge_negative: Option<f64>,
    pub max_discharge: Option<f64>,
    pub end_discharge: Option<f64>,
    pub max_velocity: Option<f64>,
    pub end_velocity: Option<f64>,
    /// Largest water level difference between the two endpoints.
    pub max_waterlevel_head: Option<f64>,
    pub max_waterlevel_start: Option<f64>,
    pub max_waterlevel_end: Option<f64>,
    pub end_waterlevel_start: Option<f64>,
    pub end_waterlevel_end: Option<f64>,
    pub abs_length: Option<f64>,
}

/// One row of `pipe_stats`. The gradient and filling fields are
/// back-filled from `flowline_stats` after the base insert.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipeStatsRow {
    pub id: i64,
    pub code: String,
    pub display_name: String,
    pub sewerage_type: Option<i64>,
    pub invert_level_start: Option<f64>,
    pub invert_level_end: Option<f64>,
    pub profile_height: Option<f64>,
    pub max_hydro_gradient: Option<f64>,
    pub max_filling: Option<f64>,
    pub end_filling: Option<f64>,
}

/// One row of `weir_stats`. The percentage and overfall fields are
/// back-filled from `flowline_stats` after the base insert.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeirStatsRow {
    pub id: i64,
    pub code: String,
    pub display_name: String,
    pub crest_level: Option<f64>,
    pub perc_volume: Option<f64>,
    pub perc_volume_positive: Option<f64>,
    pub perc_volume_negative: Option<f64>,
    pub max_overfall_height: Option<f64>,
}

/// One row of `pump_stats`, keyed by the 0-based pump-axis position.
/// `model_id` keeps the external pump identifier alongside.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PumpStatsRow {
    pub id: i64,
    pub model_id: i64,
    pub code: String,
    pub display_name: String,
    /// Rated capacity in m3/s.
    pub capacity: Option<f64>,
    pub cum_discharge: Option<f64>,
    pub end_discharge: Option<f64>,
    pub max_discharge: Option<f64>,
    /// Hours the pump would need at rated capacity to move the
    /// cumulative volume.
    pub duration_at_capacity: Option<f64>,
    pub perc_max_discharge: Option<f64>,
    pub perc_end_discharge: Option<f64>,
}

/// One row of `stat_source`: where a derived field's numbers came from.
/// `(table_name, field_name)` is the upsert identity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatSourceRow {
    pub table_name: String,
    pub field_name: String,
    /// Result variable the field was computed from.
    pub input_param: String,
    /// True when a solver-side aggregate supplied the value directly.
    pub from_aggregate: bool,
    /// Average step of the accumulation in seconds; NULL for aggregate
    /// sources.
    pub timestep: Option<f64>,
}
