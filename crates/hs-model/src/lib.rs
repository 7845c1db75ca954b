//! hs-model: static network metadata format and validation.
//!
//! The network model names the manholes, pipes, weirs and pumps that
//! statistics are reported for, with the attributes the reporting joins
//! in: levels, crest heights, cross sections and pump capacities.

pub mod profile;
pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{validate_model, ValidationError, LATEST_VERSION};

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &std::path::Path) -> ModelResult<NetworkModel> {
    let content = std::fs::read_to_string(path)?;
    let model: NetworkModel = serde_yaml::from_str(&content)?;
    validate_model(&model)?;
    Ok(model)
}

pub fn save_yaml(path: &std::path::Path, model: &NetworkModel) -> ModelResult<()> {
    validate_model(model)?;
    let content = serde_yaml::to_string(model)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ModelResult<NetworkModel> {
    let content = std::fs::read_to_string(path)?;
    let model: NetworkModel = serde_json::from_str(&content)?;
    validate_model(&model)?;
    Ok(model)
}

pub fn save_json(path: &std::path::Path, model: &NetworkModel) -> ModelResult<()> {
    validate_model(model)?;
    let content = serde_json::to_string_pretty(model)?;
    std::fs::write(path, content)?;
    Ok(())
}
