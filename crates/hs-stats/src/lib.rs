//! hs-stats: per-element statistics from simulation results.
//!
//! One run walks the result time axis once per element family and derives
//! summary rows for manholes, flowlines, pipes, weirs and pumps:
//! - mapper: external model ids to result-store positions
//! - accumulator: running maxima, time-weighted sums, threshold durations
//! - shortcut: prefer solver-side aggregates when the run carries them
//! - derive: fillings, gradients, percentages, overfall heights
//! - provenance: which variable fed which stored field
//! - engine: the orchestrated run against a statistics store
//!
//! Elements that cannot be tied to the results are logged and skipped;
//! values the run cannot define stay absent instead of becoming zeros.

pub mod accumulator;
pub mod derive;
pub mod engine;
pub mod flowline_stats;
pub mod mapper;
pub mod node_stats;
pub mod params;
pub mod pipe_weir_stats;
pub mod provenance;
pub mod pump_stats;
pub mod shortcut;

pub use accumulator::{CumulativeSum, RunningMax, SignClip, ThresholdDuration};
pub use engine::{run_statistics, StatsSummary};
pub use mapper::IdIndexMap;
pub use provenance::{average_timestep, ProvenanceLog};
pub use shortcut::MetricSource;

pub type StatsResult<T> = Result<T, StatsError>;

#[derive(thiserror::Error, Debug)]
pub enum StatsError {
    #[error("Series error: {0}")]
    Series(#[from] hs_series::SeriesError),

    #[error("Store error: {0}")]
    Store(#[from] hs_store::StoreError),

    #[error("Result source has no time steps")]
    EmptyTimeAxis,

    #[error("Aggregate variable {parameter} has no steps")]
    EmptyAggregate { parameter: String },
}
