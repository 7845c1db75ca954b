//! In-memory result source, assembled directly or loaded from a results
//! document.

use std::collections::{BTreeMap, HashMap};

use hs_core::ModelId;
use serde::{Deserialize, Serialize};

use crate::source::{FlowlineKind, ResultFlowline, ResultNode, ResultSource};
use crate::{MaskedArray, SeriesError, SeriesResult};

/// Stored series of one variable: one masked array per time step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSeries {
    /// Own time axis for aggregate variables. Raw variables ride the run
    /// axis and leave this unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<Vec<f64>>,
    pub steps: Vec<MaskedArray>,
}

/// A [`ResultSource`] holding every step in memory.
pub struct MemoryResultSource {
    timestamps: Vec<f64>,
    nodes: Vec<ResultNode>,
    flowlines: Vec<ResultFlowline>,
    pump_count: usize,
    pump_index_map: HashMap<ModelId, usize>,
    variables: BTreeMap<String, VariableSeries>,
}

impl MemoryResultSource {
    /// Assembles a source after checking that every variable is step-wise
    /// consistent and sits on a time axis of matching length.
    pub fn from_parts(
        timestamps: Vec<f64>,
        nodes: Vec<ResultNode>,
        flowlines: Vec<ResultFlowline>,
        pump_count: usize,
        pump_index_map: HashMap<ModelId, usize>,
        variables: BTreeMap<String, VariableSeries>,
    ) -> SeriesResult<Self> {
        for (name, series) in &variables {
            let axis_len = match &series.timestamps {
                Some(own) => own.len(),
                None => timestamps.len(),
            };
            if series.steps.len() != axis_len {
                return Err(SeriesError::LengthMismatch {
                    what: format!("time axis of variable {name}"),
                    expected: axis_len,
                    got: series.steps.len(),
                });
            }
            if let Some(first) = series.steps.first() {
                for (i, step) in series.steps.iter().enumerate() {
                    if step.len() != first.len() {
                        return Err(SeriesError::LengthMismatch {
                            what: format!("variable {name} step {i}"),
                            expected: first.len(),
                            got: step.len(),
                        });
                    }
                }
            }
        }
        Ok(Self {
            timestamps,
            nodes,
            flowlines,
            pump_count,
            pump_index_map,
            variables,
        })
    }
}

impl ResultSource for MemoryResultSource {
    fn available_variables(&self) -> Vec<String> {
        self.variables.keys().cloned().collect()
    }

    fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    fn aggregate_timestamps(&self, variable: &str) -> SeriesResult<&[f64]> {
        let series = self
            .variables
            .get(variable)
            .ok_or_else(|| SeriesError::UnknownVariable(variable.to_string()))?;
        Ok(series.timestamps.as_deref().unwrap_or(&self.timestamps))
    }

    fn values_at(
        &self,
        variable: &str,
        step: usize,
        subset: Option<&[usize]>,
    ) -> SeriesResult<MaskedArray> {
        let series = self
            .variables
            .get(variable)
            .ok_or_else(|| SeriesError::UnknownVariable(variable.to_string()))?;
        let array = series
            .steps
            .get(step)
            .ok_or_else(|| SeriesError::StepOutOfRange {
                variable: variable.to_string(),
                step,
                len: series.steps.len(),
            })?;
        match subset {
            Some(indices) => array.take(indices),
            None => Ok(array.clone()),
        }
    }

    fn pump_count(&self) -> usize {
        self.pump_count
    }

    fn nodes(&self) -> &[ResultNode] {
        &self.nodes
    }

    fn flowlines(&self) -> &[ResultFlowline] {
        &self.flowlines
    }

    fn pump_index_map(&self) -> &HashMap<ModelId, usize> {
        &self.pump_index_map
    }
}

/// Incremental construction of a [`MemoryResultSource`], mainly for tests
/// and fixtures.
pub struct MemorySourceBuilder {
    timestamps: Vec<f64>,
    nodes: Vec<ResultNode>,
    flowlines: Vec<ResultFlowline>,
    pump_count: usize,
    pump_index_map: HashMap<ModelId, usize>,
    variables: BTreeMap<String, VariableSeries>,
}

impl MemorySourceBuilder {
    pub fn new(timestamps: Vec<f64>) -> Self {
        Self {
            timestamps,
            nodes: Vec::new(),
            flowlines: Vec::new(),
            pump_count: 0,
            pump_index_map: HashMap::new(),
            variables: BTreeMap::new(),
        }
    }

    /// Appends a node row and returns its result-store index.
    pub fn add_node(&mut self, model_id: Option<i64>) -> usize {
        self.nodes.push(ResultNode {
            model_id: model_id.map(ModelId::new),
        });
        self.nodes.len() - 1
    }

    /// Appends a flowline row and returns its result-store index.
    pub fn add_flowline(
        &mut self,
        model_id: Option<i64>,
        kind: FlowlineKind,
        start_node: usize,
        end_node: usize,
        length_m: Option<f64>,
    ) -> usize {
        self.flowlines.push(ResultFlowline {
            model_id: model_id.map(ModelId::new),
            kind,
            start_node,
            end_node,
            length_m,
        });
        self.flowlines.len() - 1
    }

    /// Appends a pump slot and returns its 1-based position on the pump
    /// axis. Slots without an external id stay out of the position map.
    pub fn add_pump(&mut self, model_id: Option<i64>) -> usize {
        self.pump_count += 1;
        if let Some(id) = model_id {
            self.pump_index_map.insert(ModelId::new(id), self.pump_count);
        }
        self.pump_count
    }

    /// Raw variable on the run axis, every entry valid.
    pub fn add_variable(&mut self, name: &str, steps: Vec<Vec<f64>>) {
        self.add_variable_masked(name, steps.into_iter().map(MaskedArray::from_values).collect());
    }

    pub fn add_variable_masked(&mut self, name: &str, steps: Vec<MaskedArray>) {
        self.variables.insert(
            name.to_string(),
            VariableSeries {
                timestamps: None,
                steps,
            },
        );
    }

    /// Aggregate variable carrying its own time axis.
    pub fn add_aggregate(&mut self, name: &str, timestamps: Vec<f64>, steps: Vec<Vec<f64>>) {
        self.add_aggregate_masked(
            name,
            timestamps,
            steps.into_iter().map(MaskedArray::from_values).collect(),
        );
    }

    pub fn add_aggregate_masked(
        &mut self,
        name: &str,
        timestamps: Vec<f64>,
        steps: Vec<MaskedArray>,
    ) {
        self.variables.insert(
            name.to_string(),
            VariableSeries {
                timestamps: Some(timestamps),
                steps,
            },
        );
    }

    pub fn build(self) -> SeriesResult<MemoryResultSource> {
        MemoryResultSource::from_parts(
            self.timestamps,
            self.nodes,
            self.flowlines,
            self.pump_count,
            self.pump_index_map,
            self.variables,
        )
    }
}
