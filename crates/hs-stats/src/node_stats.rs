//! Manhole statistics: one pass over the water levels at the nodes the
//! model's manholes map onto.

use hs_core::{SECONDS_PER_HOUR, round_opt};
use hs_model::NetworkModel;
use hs_series::{MaskedArray, ResultSource};
use hs_store::ManholeStatsRow;
use tracing::{info, warn};

use crate::accumulator::{RunningMax, ThresholdDuration};
use crate::derive::filling_percentage;
use crate::mapper::IdIndexMap;
use crate::params::{S1, S1_MAX};
use crate::provenance::ProvenanceLog;
use crate::shortcut::{MetricSource, aggregate_running_max};
use crate::{StatsError, StatsResult};

/// Derives the `manhole_stats` rows for one run.
///
/// Manholes whose connection node is absent from the run are reported
/// and left out; every other manhole gets a row, whether or not any of
/// its samples were valid.
pub fn calc_manhole_stats(
    source: &dyn ResultSource,
    model: &NetworkModel,
    provenance: &mut ProvenanceLog,
) -> StatsResult<Vec<ManholeStatsRow>> {
    let timestamps = source.timestamps();
    let last_step = timestamps
        .len()
        .checked_sub(1)
        .ok_or(StatsError::EmptyTimeAxis)?;

    let node_map = IdIndexMap::from_nodes(source.nodes());

    // Project the node axis down to the manholes that are present.
    let mut subset = Vec::with_capacity(model.manholes.len());
    let mut kept = Vec::with_capacity(model.manholes.len());
    for manhole in &model.manholes {
        match node_map.get(manhole.node_id) {
            Some(index) => {
                subset.push(index);
                kept.push(manhole);
            }
            None => warn!(id = %manhole.node_id, "manhole not in the results, skipping"),
        }
    }
    info!(
        manholes = kept.len(),
        skipped = model.manholes.len() - kept.len(),
        "calculating manhole statistics"
    );

    let level_max_source = MetricSource::resolve(source, S1_MAX, S1);
    let mut level_max = match level_max_source {
        MetricSource::Aggregate { parameter } => {
            aggregate_running_max(source, parameter, Some(&subset))?
        }
        MetricSource::Accumulated { .. } => RunningMax::new(kept.len()),
    };

    let mut surface_duration =
        ThresholdDuration::new(kept.iter().map(|m| m.surface_level).collect());

    // Walk the run once. The sample read at a step stays in force until
    // the next step, so durations integrate the previous sample over the
    // interval that just elapsed; extrema take the current sample.
    let mut held: Option<MaskedArray> = None;
    let mut prev_timestamp = 0.0;
    for (step, &timestamp) in timestamps.iter().enumerate() {
        let elapsed = timestamp - prev_timestamp;
        prev_timestamp = timestamp;

        let level = source.values_at(S1, step, Some(&subset))?;
        if let Some(held) = &held {
            surface_duration.update(held, elapsed);
        }
        if !level_max_source.is_aggregate() {
            level_max.update(&level);
        }
        held = Some(level);
    }

    let level_end = source.values_at(S1, last_step, Some(&subset))?;
    let level_max = level_max.finalize();
    let surface_duration = surface_duration.finalize();

    let sewerage = model.min_sewerage_by_node();

    let mut rows = Vec::with_capacity(kept.len());
    for (slot, manhole) in kept.iter().enumerate() {
        let h_max = level_max[slot];
        let h_end = level_end.get(slot);
        rows.push(ManholeStatsRow {
            id: subset[slot] as i64,
            code: manhole.code.clone(),
            display_name: manhole.display_name.clone(),
            sewerage_type: sewerage.get(&manhole.node_id).copied(),
            bottom_level: round_opt(manhole.bottom_level, 3),
            surface_level: round_opt(manhole.surface_level, 3),
            duration_water_on_surface: round_opt(
                surface_duration[slot].map(|s| s / SECONDS_PER_HOUR),
                3,
            ),
            max_waterlevel: round_opt(h_max, 3),
            end_waterlevel: round_opt(h_end, 3),
            max_waterdepth_surface: round_opt(
                h_max.zip(manhole.surface_level).map(|(h, s)| h - s),
                3,
            ),
            max_filling: round_opt(
                filling_percentage(h_max, manhole.bottom_level, manhole.surface_level),
                1,
            ),
            end_filling: round_opt(
                filling_percentage(h_end, manhole.bottom_level, manhole.surface_level),
                1,
            ),
        });
    }

    provenance.record_raw("manhole_stats", "duration_water_on_surface", S1);
    provenance.record_raw("manhole_stats", "end_waterlevel", S1);
    provenance.record_raw("manhole_stats", "end_filling", S1);
    provenance.record("manhole_stats", "max_waterlevel", &level_max_source);
    provenance.record("manhole_stats", "max_waterdepth_surface", &level_max_source);
    provenance.record("manhole_stats", "max_filling", &level_max_source);

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use hs_core::ModelId;
    use hs_model::ManholeDef;
    use hs_series::{MaskedArray, MemorySourceBuilder};

    use super::*;

    fn manhole(node_id: i64, surface: Option<f64>, bottom: Option<f64>) -> ManholeDef {
        ManholeDef {
            node_id: ModelId::new(node_id),
            code: format!("mh{node_id}"),
            display_name: format!("manhole {node_id}"),
            surface_level: surface,
            bottom_level: bottom,
        }
    }

    fn model_with(manholes: Vec<ManholeDef>) -> NetworkModel {
        NetworkModel {
            version: 1,
            name: "test".to_string(),
            manholes,
            pipes: Vec::new(),
            weirs: Vec::new(),
            pumps: Vec::new(),
        }
    }

    #[test]
    fn surface_duration_and_extrema_from_raw_levels() {
        // Levels 0.5, 1.5, 0.8 against a surface at 1.0: the middle
        // sample is on the surface and holds for the 10 s up to the
        // last step, which is 1/360 h rounded to 0.003.
        let mut b = MemorySourceBuilder::new(vec![0.0, 10.0, 20.0]);
        b.add_node(Some(1));
        b.add_variable("s1", vec![vec![0.5], vec![1.5], vec![0.8]]);
        let source = b.build().expect("failed to build source");
        let model = model_with(vec![manhole(1, Some(1.0), Some(0.0))]);

        let mut provenance = ProvenanceLog::new(Some(10.0));
        let rows =
            calc_manhole_stats(&source, &model, &mut provenance).expect("failed to calculate");

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.id, 0);
        assert_eq!(row.duration_water_on_surface, Some(0.003));
        assert_eq!(row.max_waterlevel, Some(1.5));
        assert_eq!(row.end_waterlevel, Some(0.8));
        assert_eq!(row.max_waterdepth_surface, Some(0.5));
        assert_eq!(row.max_filling, Some(100.0));
        assert_eq!(row.end_filling, Some(80.0));
    }

    #[test]
    fn unmapped_manholes_are_skipped() {
        let mut b = MemorySourceBuilder::new(vec![0.0, 10.0]);
        b.add_node(Some(1));
        b.add_variable("s1", vec![vec![0.5], vec![0.6]]);
        let source = b.build().expect("failed to build source");
        let model = model_with(vec![
            manhole(1, Some(1.0), Some(0.0)),
            manhole(99, Some(1.0), Some(0.0)),
        ]);

        let mut provenance = ProvenanceLog::new(Some(10.0));
        let rows =
            calc_manhole_stats(&source, &model, &mut provenance).expect("failed to calculate");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 0);
    }

    #[test]
    fn dry_through_the_run_leaves_extrema_null() {
        let mut b = MemorySourceBuilder::new(vec![0.0, 10.0]);
        b.add_node(Some(1));
        b.add_variable_masked(
            "s1",
            vec![
                MaskedArray::new(vec![0.0], vec![true]).expect("failed to build array"),
                MaskedArray::new(vec![0.0], vec![true]).expect("failed to build array"),
            ],
        );
        let source = b.build().expect("failed to build source");
        let model = model_with(vec![manhole(1, Some(1.0), Some(0.0))]);

        let mut provenance = ProvenanceLog::new(Some(10.0));
        let rows =
            calc_manhole_stats(&source, &model, &mut provenance).expect("failed to calculate");
        let row = &rows[0];
        assert_eq!(row.max_waterlevel, None);
        assert_eq!(row.end_waterlevel, None);
        assert_eq!(row.max_waterdepth_surface, None);
        assert_eq!(row.max_filling, None);
        // A dry manhole spends no time on the surface; that is a real
        // zero, not an unknown.
        assert_eq!(row.duration_water_on_surface, Some(0.0));
    }

    #[test]
    fn missing_surface_level_makes_the_duration_unknown() {
        let mut b = MemorySourceBuilder::new(vec![0.0, 10.0]);
        b.add_node(Some(1));
        b.add_variable("s1", vec![vec![5.0], vec![5.0]]);
        let source = b.build().expect("failed to build source");
        let model = model_with(vec![manhole(1, None, Some(0.0))]);

        let mut provenance = ProvenanceLog::new(Some(10.0));
        let rows =
            calc_manhole_stats(&source, &model, &mut provenance).expect("failed to calculate");
        let row = &rows[0];
        assert_eq!(row.duration_water_on_surface, None);
        assert_eq!(row.max_waterdepth_surface, None);
        assert_eq!(row.max_filling, None);
        assert_eq!(row.max_waterlevel, Some(5.0));
    }

    #[test]
    fn aggregate_maximum_wins_over_the_raw_series() {
        // The aggregate carries a peak the coarse raw series never saw.
        let mut b = MemorySourceBuilder::new(vec![0.0, 10.0]);
        b.add_node(Some(1));
        b.add_variable("s1", vec![vec![0.5], vec![0.6]]);
        b.add_aggregate("s1_max", vec![300.0, 600.0], vec![vec![0.9], vec![0.7]]);
        let source = b.build().expect("failed to build source");
        let model = model_with(vec![manhole(1, Some(1.0), Some(0.0))]);

        let mut provenance = ProvenanceLog::new(Some(10.0));
        let rows =
            calc_manhole_stats(&source, &model, &mut provenance).expect("failed to calculate");
        assert_eq!(rows[0].max_waterlevel, Some(0.9));
        assert_eq!(rows[0].end_waterlevel, Some(0.6));

        let sources = provenance.into_rows();
        let max_row = sources
            .iter()
            .find(|r| r.field_name == "max_waterlevel")
            .expect("missing provenance row");
        assert!(max_row.from_aggregate);
        assert_eq!(max_row.input_param, "s1_max");
        let end_row = sources
            .iter()
            .find(|r| r.field_name == "end_waterlevel")
            .expect("missing provenance row");
        assert!(!end_row.from_aggregate);
        assert_eq!(end_row.input_param, "s1");
    }

    #[test]
    fn sewerage_class_joins_from_the_touching_pipes() {
        use hs_model::PipeDef;

        let mut b = MemorySourceBuilder::new(vec![0.0, 10.0]);
        b.add_node(Some(1));
        b.add_node(Some(2));
        b.add_variable("s1", vec![vec![0.1, 0.1], vec![0.2, 0.2]]);
        let source = b.build().expect("failed to build source");

        let mut model = model_with(vec![
            manhole(1, Some(1.0), Some(0.0)),
            manhole(2, Some(1.0), Some(0.0)),
        ]);
        model.pipes.push(PipeDef {
            line_id: ModelId::new(7),
            code: String::new(),
            display_name: String::new(),
            sewerage_type: Some(2),
            invert_level_start: None,
            invert_level_end: None,
            cross_section: None,
            start_node_id: ModelId::new(1),
            end_node_id: ModelId::new(1),
        });

        let mut provenance = ProvenanceLog::new(Some(10.0));
        let rows =
            calc_manhole_stats(&source, &model, &mut provenance).expect("failed to calculate");
        assert_eq!(rows[0].sewerage_type, Some(2));
        // Manhole 2 touches no pipe and still gets a row.
        assert_eq!(rows[1].sewerage_type, None);
    }
}
