//! Shared application service layer for hydrostat.
//!
//! This crate sits between the CLI and the backend crates, centralizing
//! model loading, input fingerprinting, statistics job execution and
//! store inspection.

pub mod error;
pub mod fingerprint;
pub mod model_service;
pub mod query;
pub mod stats_service;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use fingerprint::compute_job_fingerprint;
pub use model_service::{load_network_model, summarize_model, ModelSummary};
pub use query::{list_stat_sources, summarize_store, StoreSummary};
pub use stats_service::{
    ensure_stats, JobTiming, StatsJobOptions, StatsJobRequest, StatsJobResponse,
};
