//! End-to-end statistics jobs against real files on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use hs_app::{ensure_stats, query, AppError, StatsJobOptions, StatsJobRequest};
use hs_core::ModelId;
use hs_model::{CrossSectionDef, ManholeDef, NetworkModel, PipeDef};
use hs_series::{
    save_results_json, FlowlineKind, MaskedArray, ResultFlowline, ResultNode, ResultsDocument,
    VariableSeries,
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

fn raw_series(steps: Vec<Vec<f64>>) -> VariableSeries {
    VariableSeries {
        timestamps: None,
        steps: steps.into_iter().map(MaskedArray::from_values).collect(),
    }
}

fn fixture_document() -> ResultsDocument {
    ResultsDocument {
        timestamps: vec![0.0, 10.0, 20.0],
        nodes: vec![
            ResultNode {
                model_id: Some(ModelId::new(1)),
            },
            ResultNode {
                model_id: Some(ModelId::new(2)),
            },
        ],
        flowlines: vec![ResultFlowline {
            model_id: Some(ModelId::new(100)),
            kind: FlowlineKind::Pipe,
            start_node: 0,
            end_node: 1,
            length_m: Some(50.0),
        }],
        pump_count: 0,
        pump_index_map: BTreeMap::new(),
        variables: BTreeMap::from([
            (
                "s1".to_string(),
                raw_series(vec![vec![0.5, 1.0], vec![1.5, 2.0], vec![0.8, 1.5]]),
            ),
            (
                "q".to_string(),
                raw_series(vec![vec![2.0], vec![1.0], vec![0.5]]),
            ),
            (
                "u1".to_string(),
                raw_series(vec![vec![0.4], vec![0.2], vec![0.1]]),
            ),
        ]),
    }
}

fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let model = NetworkModel {
        version: 1,
        name: "district".to_string(),
        manholes: vec![
            ManholeDef {
                node_id: ModelId::new(1),
                code: "MH1".to_string(),
                display_name: String::new(),
                surface_level: Some(1.0),
                bottom_level: Some(0.0),
            },
            ManholeDef {
                node_id: ModelId::new(2),
                code: "MH2".to_string(),
                display_name: String::new(),
                surface_level: Some(3.0),
                bottom_level: Some(0.5),
            },
        ],
        pipes: vec![PipeDef {
            line_id: ModelId::new(100),
            code: "P100".to_string(),
            display_name: String::new(),
            sewerage_type: Some(1),
            invert_level_start: Some(1.0),
            invert_level_end: Some(1.0),
            cross_section: Some(CrossSectionDef {
                shape: Some(1),
                width: Some("1.0".to_string()),
                height: Some("2.0".to_string()),
            }),
            start_node_id: ModelId::new(1),
            end_node_id: ModelId::new(2),
        }],
        weirs: Vec::new(),
        pumps: Vec::new(),
    };
    let model_path = dir.join("network.yaml");
    hs_model::save_yaml(&model_path, &model).expect("failed to write model");

    let results_path = dir.join("results.json");
    save_results_json(&results_path, &fixture_document()).expect("failed to write results");

    (model_path, results_path)
}

#[test]
fn job_computes_then_skips_then_forces() {
    let dir = unique_temp_dir("hs_app_job_lifecycle");
    std::fs::create_dir_all(&dir).expect("failed to create temp dir");
    let (model_path, results_path) = write_inputs(&dir);
    let store_path = dir.join("stats.sqlite");

    let request = StatsJobRequest {
        model_path: &model_path,
        results_path: &results_path,
        store_path: &store_path,
        options: StatsJobOptions::default(),
    };

    let first = ensure_stats(&request).expect("first job failed");
    assert!(!first.skipped);
    assert_eq!(first.fingerprint.len(), 64);
    assert!(first.completed_at.is_some());
    let summary = first.summary.expect("first job should carry a summary");
    assert_eq!(summary.manholes, 2);
    assert_eq!(summary.flowlines, 1);
    assert_eq!(summary.pipes, 1);
    assert_eq!(summary.weirs, 0);
    assert_eq!(summary.pumps, 0);
    assert_eq!(summary.sources, 25);

    let second = ensure_stats(&request).expect("second job failed");
    assert!(second.skipped);
    assert!(second.summary.is_none());
    assert_eq!(second.fingerprint, first.fingerprint);
    assert_eq!(second.completed_at, first.completed_at);

    let forced = ensure_stats(&StatsJobRequest {
        model_path: &model_path,
        results_path: &results_path,
        store_path: &store_path,
        options: StatsJobOptions {
            force: true,
            ..StatsJobOptions::default()
        },
    })
    .expect("forced job failed");
    assert!(!forced.skipped);
    assert!(forced.summary.is_some());
}

#[test]
fn changed_inputs_recompute() {
    let dir = unique_temp_dir("hs_app_job_changed_inputs");
    std::fs::create_dir_all(&dir).expect("failed to create temp dir");
    let (model_path, results_path) = write_inputs(&dir);
    let store_path = dir.join("stats.sqlite");

    let request = StatsJobRequest {
        model_path: &model_path,
        results_path: &results_path,
        store_path: &store_path,
        options: StatsJobOptions::default(),
    };

    let first = ensure_stats(&request).expect("first job failed");
    assert!(!first.skipped);

    let mut edited = fixture_document();
    edited
        .variables
        .insert("q".to_string(), raw_series(vec![vec![3.0], vec![1.0], vec![0.5]]));
    save_results_json(&results_path, &edited).expect("failed to rewrite results");

    let second = ensure_stats(&request).expect("second job failed");
    assert!(!second.skipped);
    assert_ne!(second.fingerprint, first.fingerprint);
}

#[test]
fn store_queries_reflect_the_job() {
    let dir = unique_temp_dir("hs_app_job_queries");
    std::fs::create_dir_all(&dir).expect("failed to create temp dir");
    let (model_path, results_path) = write_inputs(&dir);
    let store_path = dir.join("stats.sqlite");

    let response = ensure_stats(&StatsJobRequest {
        model_path: &model_path,
        results_path: &results_path,
        store_path: &store_path,
        options: StatsJobOptions::default(),
    })
    .expect("job failed");

    let summary = query::summarize_store(&store_path).expect("failed to summarize store");
    assert_eq!(summary.fingerprint.as_deref(), Some(response.fingerprint.as_str()));
    assert_eq!(summary.completed_at, response.completed_at);
    let counts: BTreeMap<&str, i64> = summary.table_counts.iter().copied().collect();
    assert_eq!(counts["manhole_stats"], 2);
    assert_eq!(counts["flowline_stats"], 1);
    assert_eq!(counts["pipe_stats"], 1);
    assert_eq!(counts["weir_stats"], 0);
    assert_eq!(counts["pump_stats"], 0);
    assert_eq!(counts["stat_source"], 25);

    let sources = query::list_stat_sources(&store_path).expect("failed to load stat sources");
    assert_eq!(sources.len(), 25);
    assert!(sources
        .iter()
        .any(|row| row.table_name == "manhole_stats" && row.field_name == "max_waterlevel"));
}

#[test]
fn missing_store_is_reported() {
    let dir = unique_temp_dir("hs_app_missing_store");
    std::fs::create_dir_all(&dir).expect("failed to create temp dir");

    let err = query::summarize_store(&dir.join("absent.sqlite"))
        .expect_err("summarizing a missing store should fail");
    assert!(matches!(err, AppError::InvalidInput(_)));
}
