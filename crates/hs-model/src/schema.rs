//! Network model schema definitions.

use std::collections::HashMap;

use hs_core::ModelId;
use serde::{Deserialize, Serialize};

/// Static description of a sewerage network: the elements statistics are
/// reported for, keyed by their external model identifiers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkModel {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub manholes: Vec<ManholeDef>,
    #[serde(default)]
    pub pipes: Vec<PipeDef>,
    #[serde(default)]
    pub weirs: Vec<WeirDef>,
    #[serde(default)]
    pub pumps: Vec<PumpDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManholeDef {
    /// External identifier of the connection node the manhole sits on.
    pub node_id: ModelId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub display_name: String,
    /// Ground level at the manhole, m above datum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_level: Option<f64>,
    /// Manhole bottom, m above datum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom_level: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipeDef {
    /// External identifier of the flowline the pipe is computed on.
    pub line_id: ModelId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub display_name: String,
    /// Sewerage class code. Lower codes take precedence when a node
    /// touches pipes of several classes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sewerage_type: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invert_level_start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invert_level_end: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_section: Option<CrossSectionDef>,
    pub start_node_id: ModelId,
    pub end_node_id: ModelId,
}

/// Cross-section profile as modellers enter it: a shape code plus width
/// and height columns holding space-separated ordinate lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrossSectionDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeirDef {
    pub line_id: ModelId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub display_name: String,
    /// Crest level, m above datum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crest_level: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PumpDef {
    pub pump_id: ModelId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub display_name: String,
    /// Rated capacity in litres per second, as entered in the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_l_s: Option<f64>,
}

impl NetworkModel {
    /// Lowest sewerage class code among the pipes touching each node.
    /// Nodes with no classed pipe are absent from the map.
    pub fn min_sewerage_by_node(&self) -> HashMap<ModelId, i64> {
        let mut min_by_node: HashMap<ModelId, i64> = HashMap::new();
        for pipe in &self.pipes {
            let Some(class) = pipe.sewerage_type else {
                continue;
            };
            for node in [pipe.start_node_id, pipe.end_node_id] {
                min_by_node
                    .entry(node)
                    .and_modify(|current| *current = (*current).min(class))
                    .or_insert(class);
            }
        }
        min_by_node
    }
}
