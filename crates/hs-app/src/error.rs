//! Error types for the hs-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates
/// and provides a unified error interface for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Model error: {0}")]
    Model(String),

    #[error("Failed to read input file: {path}")]
    InputFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Results error: {0}")]
    Results(String),

    #[error("Statistics error: {0}")]
    Stats(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for hs-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<hs_model::ModelError> for AppError {
    fn from(err: hs_model::ModelError) -> Self {
        AppError::Model(err.to_string())
    }
}

impl From<hs_series::SeriesError> for AppError {
    fn from(err: hs_series::SeriesError) -> Self {
        AppError::Results(err.to_string())
    }
}

impl From<hs_stats::StatsError> for AppError {
    fn from(err: hs_stats::StatsError) -> Self {
        AppError::Stats(err.to_string())
    }
}

impl From<hs_store::StoreError> for AppError {
    fn from(err: hs_store::StoreError) -> Self {
        AppError::Store(err.to_string())
    }
}
