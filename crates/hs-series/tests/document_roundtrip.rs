use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use hs_core::ModelId;
use hs_series::{
    load_results_json, save_results_json, FlowlineKind, MaskedArray, ResultFlowline, ResultNode,
    ResultSource, ResultsDocument, VariableSeries,
};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

#[test]
fn save_load_roundtrip() {
    let dir = unique_temp_dir("hs_series_doc");
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    let path = dir.join("results.json");

    let doc = ResultsDocument {
        timestamps: vec![0.0, 10.0, 20.0],
        nodes: vec![
            ResultNode { model_id: Some(ModelId::new(4)) },
            ResultNode { model_id: None },
        ],
        flowlines: vec![ResultFlowline {
            model_id: Some(ModelId::new(9)),
            kind: FlowlineKind::Pipe,
            start_node: 0,
            end_node: 1,
            length_m: Some(25.0),
        }],
        pump_count: 1,
        pump_index_map: BTreeMap::from([("12".to_string(), 1)]),
        variables: BTreeMap::from([
            (
                "s1".to_string(),
                VariableSeries {
                    timestamps: None,
                    steps: vec![
                        MaskedArray::from_values(vec![0.1, 0.2]),
                        MaskedArray::from_sentinel(vec![0.3, -9999.0], -9999.0),
                        MaskedArray::from_values(vec![0.5, 0.6]),
                    ],
                },
            ),
            (
                "q_cum".to_string(),
                VariableSeries {
                    timestamps: Some(vec![0.0, 20.0]),
                    steps: vec![
                        MaskedArray::from_values(vec![0.0]),
                        MaskedArray::from_values(vec![7.5]),
                    ],
                },
            ),
        ]),
    };

    save_results_json(&path, &doc).expect("failed to save document");
    let source = load_results_json(&path).expect("failed to load document");

    assert_eq!(source.timestamps(), &[0.0, 10.0, 20.0]);
    assert_eq!(source.node_count(), 2);
    assert_eq!(source.flowline_count(), 1);
    assert_eq!(source.pump_count(), 1);
    assert_eq!(source.pump_index_map().get(&ModelId::new(12)), Some(&1));
    assert_eq!(
        source.available_variables(),
        vec!["q_cum".to_string(), "s1".to_string()]
    );

    // The dry entry written at step 1 stays masked after the roundtrip.
    let levels = source.values_at("s1", 1, None).expect("failed to read s1");
    assert_eq!(levels.get(0), Some(0.3));
    assert_eq!(levels.get(1), None);

    assert_eq!(
        source.aggregate_timestamps("q_cum").expect("missing q_cum axis"),
        &[0.0, 20.0]
    );
}
