//! On-disk results document: a JSON rendition of one run's variables and
//! element tables.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use hs_core::ModelId;
use serde::{Deserialize, Serialize};

use crate::memory::{MemoryResultSource, VariableSeries};
use crate::source::{ResultFlowline, ResultNode};
use crate::{SeriesError, SeriesResult};

/// Serialized form of one run. Pump map keys are external pump ids
/// written as decimal strings, since JSON objects key on strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsDocument {
    pub timestamps: Vec<f64>,
    #[serde(default)]
    pub nodes: Vec<ResultNode>,
    #[serde(default)]
    pub flowlines: Vec<ResultFlowline>,
    #[serde(default)]
    pub pump_count: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub pump_index_map: BTreeMap<String, usize>,
    #[serde(default)]
    pub variables: BTreeMap<String, VariableSeries>,
}

impl ResultsDocument {
    /// Turns the document into a queryable source, parsing pump map keys
    /// and validating axis lengths.
    pub fn into_source(self) -> SeriesResult<MemoryResultSource> {
        let mut pump_index_map = HashMap::new();
        for (key, position) in self.pump_index_map {
            let id: i64 = key
                .parse()
                .map_err(|_| SeriesError::InvalidPumpKey(key.clone()))?;
            pump_index_map.insert(ModelId::new(id), position);
        }
        MemoryResultSource::from_parts(
            self.timestamps,
            self.nodes,
            self.flowlines,
            self.pump_count,
            pump_index_map,
            self.variables,
        )
    }
}

pub fn load_results_json(path: &Path) -> SeriesResult<MemoryResultSource> {
    let text = fs::read_to_string(path)?;
    let doc: ResultsDocument = serde_json::from_str(&text)?;
    doc.into_source()
}

pub fn save_results_json(path: &Path, doc: &ResultsDocument) -> SeriesResult<()> {
    let text = serde_json::to_string_pretty(doc)?;
    fs::write(path, text)?;
    Ok(())
}
