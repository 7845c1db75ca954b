//! Network model validation logic.

use std::collections::HashSet;

use hs_core::ModelId;

use crate::schema::NetworkModel;

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: ModelId, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_model(model: &NetworkModel) -> Result<(), ValidationError> {
    if model.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: model.version,
        });
    }

    let mut node_ids = HashSet::new();
    for manhole in &model.manholes {
        if !node_ids.insert(manhole.node_id) {
            return Err(ValidationError::DuplicateId {
                id: manhole.node_id,
                context: "manholes".to_string(),
            });
        }
        for (field, level) in [
            ("surface_level", manhole.surface_level),
            ("bottom_level", manhole.bottom_level),
        ] {
            if let Some(v) = level {
                if !v.is_finite() {
                    return Err(ValidationError::InvalidValue {
                        field: format!("manhole {} {field}", manhole.node_id),
                        value: v.to_string(),
                        reason: "must be finite".to_string(),
                    });
                }
            }
        }
    }

    // Pipes and weirs live on the same flowline axis, so their ids share
    // one namespace.
    let mut line_ids = HashSet::new();
    for pipe in &model.pipes {
        if !line_ids.insert(pipe.line_id) {
            return Err(ValidationError::DuplicateId {
                id: pipe.line_id,
                context: "pipes".to_string(),
            });
        }
    }
    for weir in &model.weirs {
        if !line_ids.insert(weir.line_id) {
            return Err(ValidationError::DuplicateId {
                id: weir.line_id,
                context: "weirs".to_string(),
            });
        }
    }

    let mut pump_ids = HashSet::new();
    for pump in &model.pumps {
        if !pump_ids.insert(pump.pump_id) {
            return Err(ValidationError::DuplicateId {
                id: pump.pump_id,
                context: "pumps".to_string(),
            });
        }
        if let Some(capacity) = pump.capacity_l_s {
            if !capacity.is_finite() {
                return Err(ValidationError::InvalidValue {
                    field: format!("pump {} capacity_l_s", pump.pump_id),
                    value: capacity.to_string(),
                    reason: "must be finite".to_string(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ManholeDef, PipeDef, WeirDef};

    fn empty_model() -> NetworkModel {
        NetworkModel {
            version: 1,
            name: "t".to_string(),
            manholes: Vec::new(),
            pipes: Vec::new(),
            weirs: Vec::new(),
            pumps: Vec::new(),
        }
    }

    fn pipe(line_id: i64) -> PipeDef {
        PipeDef {
            line_id: ModelId::new(line_id),
            code: String::new(),
            display_name: String::new(),
            sewerage_type: None,
            invert_level_start: None,
            invert_level_end: None,
            cross_section: None,
            start_node_id: ModelId::new(1),
            end_node_id: ModelId::new(2),
        }
    }

    #[test]
    fn duplicate_manhole_node_is_rejected() {
        let mut model = empty_model();
        for _ in 0..2 {
            model.manholes.push(ManholeDef {
                node_id: ModelId::new(7),
                code: String::new(),
                display_name: String::new(),
                surface_level: None,
                bottom_level: None,
            });
        }
        assert!(matches!(
            validate_model(&model),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn pipe_and_weir_share_the_line_namespace() {
        let mut model = empty_model();
        model.pipes.push(pipe(5));
        model.weirs.push(WeirDef {
            line_id: ModelId::new(5),
            code: String::new(),
            display_name: String::new(),
            crest_level: None,
        });
        assert!(matches!(
            validate_model(&model),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn newer_version_is_rejected() {
        let mut model = empty_model();
        model.version = LATEST_VERSION + 1;
        assert!(matches!(
            validate_model(&model),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn nonfinite_surface_level_is_rejected() {
        let mut model = empty_model();
        model.manholes.push(ManholeDef {
            node_id: ModelId::new(1),
            code: String::new(),
            display_name: String::new(),
            surface_level: Some(f64::NAN),
            bottom_level: None,
        });
        assert!(matches!(
            validate_model(&model),
            Err(ValidationError::InvalidValue { .. })
        ));
    }
}
