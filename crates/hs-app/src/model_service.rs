//! Network model loading and introspection.

use std::path::Path;

use hs_model::NetworkModel;

use crate::error::AppResult;

/// Per-family element counts for listing.
#[derive(Debug, Clone)]
pub struct ModelSummary {
    pub name: String,
    pub manhole_count: usize,
    pub pipe_count: usize,
    pub weir_count: usize,
    pub pump_count: usize,
}

/// Load a network model from a YAML or JSON file. Validation runs as
/// part of the load, so a returned model is always well-formed.
pub fn load_network_model(path: &Path) -> AppResult<NetworkModel> {
    let model = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => hs_model::load_json(path)?,
        _ => hs_model::load_yaml(path)?,
    };
    Ok(model)
}

/// Summarize a loaded model for display.
pub fn summarize_model(model: &NetworkModel) -> ModelSummary {
    ModelSummary {
        name: model.name.clone(),
        manhole_count: model.manholes.len(),
        pipe_count: model.pipes.len(),
        weir_count: model.weirs.len(),
        pump_count: model.pumps.len(),
    }
}
