//! Mapping from external model identifiers to result-store positions.
//!
//! Element tables tie a result axis position to the external id the
//! network model uses. The forward map is partial (solver-introduced
//! elements carry no external id, model elements may be absent from the
//! run) and must stay injective, so duplicate ids keep their first
//! position and are reported.

use std::collections::HashMap;

use hs_core::ModelId;
use hs_series::{FlowlineKind, ResultFlowline, ResultNode};
use tracing::warn;

/// Injective partial map from [`ModelId`] to a position on one result
/// axis. Built once per element family and consulted per element;
/// lookups that miss are the caller's cue to skip, never an error.
#[derive(Debug, Clone, Default)]
pub struct IdIndexMap {
    to_index: HashMap<ModelId, usize>,
}

impl IdIndexMap {
    /// Map over the node axis, from the node element table.
    pub fn from_nodes(nodes: &[ResultNode]) -> Self {
        let mut map = Self::default();
        for (index, node) in nodes.iter().enumerate() {
            if let Some(id) = node.model_id {
                map.insert(id, index, "node");
            }
        }
        map
    }

    /// Map over the flowline axis, restricted to one flowline kind.
    pub fn from_flowlines(flowlines: &[ResultFlowline], kind: FlowlineKind) -> Self {
        let mut map = Self::default();
        for (index, flowline) in flowlines.iter().enumerate() {
            if flowline.kind != kind {
                continue;
            }
            if let Some(id) = flowline.model_id {
                map.insert(id, index, "flowline");
            }
        }
        map
    }

    /// Map over the pump axis, from the source's 1-based position table.
    /// Positions outside `1..=pump_count` are corrupt and skipped.
    pub fn from_pump_positions(positions: &HashMap<ModelId, usize>, pump_count: usize) -> Self {
        let mut map = Self::default();
        for (&id, &position) in positions {
            if position == 0 || position > pump_count {
                warn!(%id, position, pump_count, "pump position out of range, skipping");
                continue;
            }
            map.insert(id, position - 1, "pump");
        }
        map
    }

    fn insert(&mut self, id: ModelId, index: usize, family: &str) {
        if let Some(&kept) = self.to_index.get(&id) {
            warn!(%id, kept, rejected = index, "duplicate {family} id, keeping first position");
            return;
        }
        self.to_index.insert(id, index);
    }

    pub fn get(&self, id: ModelId) -> Option<usize> {
        self.to_index.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.to_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(model_id: Option<i64>) -> ResultNode {
        ResultNode {
            model_id: model_id.map(ModelId::new),
        }
    }

    #[test]
    fn nodes_without_model_id_are_unmappable() {
        let map = IdIndexMap::from_nodes(&[node(Some(5)), node(None), node(Some(9))]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(ModelId::new(5)), Some(0));
        assert_eq!(map.get(ModelId::new(9)), Some(2));
        assert_eq!(map.get(ModelId::new(6)), None);
    }

    #[test]
    fn duplicate_ids_keep_the_first_position() {
        let map = IdIndexMap::from_nodes(&[node(Some(5)), node(Some(5))]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(ModelId::new(5)), Some(0));
    }

    #[test]
    fn flowline_map_filters_by_kind() {
        let lines = vec![
            ResultFlowline {
                model_id: Some(ModelId::new(1)),
                kind: FlowlineKind::Pipe,
                start_node: 0,
                end_node: 1,
                length_m: None,
            },
            ResultFlowline {
                model_id: Some(ModelId::new(2)),
                kind: FlowlineKind::Weir,
                start_node: 1,
                end_node: 2,
                length_m: None,
            },
        ];
        let pipes = IdIndexMap::from_flowlines(&lines, FlowlineKind::Pipe);
        assert_eq!(pipes.get(ModelId::new(1)), Some(0));
        assert_eq!(pipes.get(ModelId::new(2)), None);
        let weirs = IdIndexMap::from_flowlines(&lines, FlowlineKind::Weir);
        assert_eq!(weirs.get(ModelId::new(2)), Some(1));
    }

    #[test]
    fn pump_positions_shift_to_zero_based_and_drop_corrupt_entries() {
        let mut positions = HashMap::new();
        positions.insert(ModelId::new(10), 1);
        positions.insert(ModelId::new(11), 3);
        positions.insert(ModelId::new(12), 0); // corrupt: positions are 1-based
        positions.insert(ModelId::new(13), 4); // past the axis
        let map = IdIndexMap::from_pump_positions(&positions, 3);
        assert_eq!(map.get(ModelId::new(10)), Some(0));
        assert_eq!(map.get(ModelId::new(11)), Some(2));
        assert_eq!(map.get(ModelId::new(12)), None);
        assert_eq!(map.get(ModelId::new(13)), None);
    }
}
