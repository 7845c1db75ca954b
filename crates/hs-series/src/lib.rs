//! hs-series: read-only access to simulation result time series.
//!
//! A [`ResultSource`] exposes the raw per-step variables of a finished
//! hydraulic run (water levels, discharges, velocities, pump discharges)
//! together with the element tables that tie result-store positions back
//! to external model identifiers. Values come back as [`MaskedArray`]s so
//! dry or inactive elements stay distinguishable from real zeros.

pub mod json;
pub mod masked;
pub mod memory;
pub mod source;

pub use json::{load_results_json, save_results_json, ResultsDocument};
pub use masked::MaskedArray;
pub use memory::{MemoryResultSource, MemorySourceBuilder, VariableSeries};
pub use source::{FlowlineKind, ResultFlowline, ResultNode, ResultSource};

pub type SeriesResult<T> = Result<T, SeriesError>;

#[derive(thiserror::Error, Debug)]
pub enum SeriesError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown result variable: {0}")]
    UnknownVariable(String),

    #[error("Step {step} out of range for variable {variable} ({len} steps)")]
    StepOutOfRange {
        variable: String,
        step: usize,
        len: usize,
    },

    #[error("Element index {index} out of range (len={len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Length mismatch for {what}: expected {expected}, got {got}")]
    LengthMismatch {
        what: String,
        expected: usize,
        got: usize,
    },

    #[error("Invalid pump id key: {0}")]
    InvalidPumpKey(String),
}
