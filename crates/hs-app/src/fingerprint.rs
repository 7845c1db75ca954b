//! Content-based fingerprinting of job inputs.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{AppError, AppResult};

/// Hash the model file, the results file and the engine version into one
/// hex digest. Two jobs with the same digest would write the same rows,
/// so an unchanged digest lets a rerun skip recomputation.
pub fn compute_job_fingerprint(
    model_path: &Path,
    results_path: &Path,
    engine_version: &str,
) -> AppResult<String> {
    let mut hasher = Sha256::new();

    let model_bytes = std::fs::read(model_path).map_err(|e| AppError::InputFileRead {
        path: model_path.to_path_buf(),
        source: e,
    })?;
    hasher.update(&model_bytes);

    let results_bytes = std::fs::read(results_path).map_err(|e| AppError::InputFileRead {
        path: results_path.to_path_buf(),
        source: e,
    })?;
    hasher.update(&results_bytes);

    hasher.update(engine_version.as_bytes());

    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}
