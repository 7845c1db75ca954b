//! The read interface statistics passes run against.

use std::collections::HashMap;

use hs_core::ModelId;
use serde::{Deserialize, Serialize};

use crate::{MaskedArray, SeriesResult};

/// Kind tag on a flowline row of the result store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowlineKind {
    Pipe,
    Weir,
    Other,
}

/// One row of the node element table. The row's position in the table is
/// the node's result-store index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultNode {
    /// External model identifier, absent for nodes the solver added on
    /// its own (boundary and 2D cells).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<ModelId>,
}

/// One row of the flowline element table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFlowline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<ModelId>,
    pub kind: FlowlineKind,
    /// Result-store index of the upstream node.
    pub start_node: usize,
    /// Result-store index of the downstream node.
    pub end_node: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_m: Option<f64>,
}

/// Read-only access to the variables and element tables of one finished
/// simulation run.
///
/// Raw variables share the run's time axis ([`timestamps`]); aggregate
/// variables carry their own, usually coarser, axis. Implementations hand
/// out one step at a time so callers can stream over long runs without
/// holding a full variable in memory.
///
/// [`timestamps`]: ResultSource::timestamps
pub trait ResultSource {
    /// Names of every variable present in the run, raw and aggregate.
    fn available_variables(&self) -> Vec<String>;

    fn has_variable(&self, name: &str) -> bool {
        self.available_variables().iter().any(|v| v == name)
    }

    /// Ordered time axis of the raw variables, seconds from run start.
    fn timestamps(&self) -> &[f64];

    /// Time axis of the named variable: its own axis for aggregates, the
    /// run axis for raw variables.
    fn aggregate_timestamps(&self, variable: &str) -> SeriesResult<&[f64]>;

    /// All element values of `variable` at one time step. With a subset,
    /// only the given positions are returned, in the given order.
    fn values_at(
        &self,
        variable: &str,
        step: usize,
        subset: Option<&[usize]>,
    ) -> SeriesResult<MaskedArray>;

    fn node_count(&self) -> usize {
        self.nodes().len()
    }

    fn flowline_count(&self) -> usize {
        self.flowlines().len()
    }

    fn pump_count(&self) -> usize;

    fn nodes(&self) -> &[ResultNode];

    fn flowlines(&self) -> &[ResultFlowline];

    /// External pump identifier to 1-based position on the pump axis, as
    /// published by the result store.
    fn pump_index_map(&self) -> &HashMap<ModelId, usize>;
}
