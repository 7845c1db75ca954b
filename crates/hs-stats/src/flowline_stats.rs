//! Flowline statistics over the full flowline axis.
//!
//! Discharges and velocities live on the flowline axis directly; the
//! level-based figures project the node levels onto each flowline's
//! endpoints. Every flowline gets a row, keyed by its axis position,
//! so the pipe and weir passes can join against it afterwards.

use hs_core::round_opt;
use hs_series::{MaskedArray, ResultSource};
use hs_store::FlowlineStatsRow;
use tracing::{info, warn};

use crate::accumulator::{CumulativeSum, RunningMax, SignClip};
use crate::params::{Q, Q_CUM, Q_CUM_NEGATIVE, Q_CUM_POSITIVE, S1, U1};
use crate::provenance::ProvenanceLog;
use crate::shortcut::{MetricSource, read_aggregate_final};
use crate::{StatsError, StatsResult};

/// Derives the `flowline_stats` rows for one run.
pub fn calc_flowline_stats(
    source: &dyn ResultSource,
    provenance: &mut ProvenanceLog,
) -> StatsResult<Vec<FlowlineStatsRow>> {
    let timestamps = source.timestamps();
    let last_step = timestamps
        .len()
        .checked_sub(1)
        .ok_or(StatsError::EmptyTimeAxis)?;

    let flowlines = source.flowlines();
    let count = flowlines.len();
    let node_count = source.node_count();
    info!(flowlines = count, "calculating flowline statistics");

    // Endpoint positions per flowline. A flowline pointing outside the
    // node axis keeps its row, but its level statistics stay unknown.
    let mut start_nodes = Vec::with_capacity(count);
    let mut end_nodes = Vec::with_capacity(count);
    for (index, line) in flowlines.iter().enumerate() {
        if line.start_node >= node_count || line.end_node >= node_count {
            warn!(
                index,
                start = line.start_node,
                end = line.end_node,
                node_count,
                "flowline endpoints outside the node axis, level statistics unavailable"
            );
            start_nodes.push(None);
            end_nodes.push(None);
        } else {
            start_nodes.push(Some(line.start_node));
            end_nodes.push(Some(line.end_node));
        }
    }

    let cum_source = MetricSource::resolve(source, Q_CUM, Q);
    let cum_pos_source = MetricSource::resolve(source, Q_CUM_POSITIVE, Q);
    let cum_neg_source = MetricSource::resolve(source, Q_CUM_NEGATIVE, Q);

    let mut cum_acc = CumulativeSum::new(count, SignClip::Total);
    let mut cum_pos_acc = CumulativeSum::new(count, SignClip::PositiveOnly);
    let mut cum_neg_acc = CumulativeSum::new(count, SignClip::NegativeOnly);
    let mut discharge_max = RunningMax::new(count);
    let mut velocity_max = RunningMax::new(count);
    let mut head_max = RunningMax::new(count);
    let mut level_max_start = RunningMax::new(count);
    let mut level_max_end = RunningMax::new(count);

    let mut held_q: Option<MaskedArray> = None;
    let mut prev_timestamp = 0.0;
    for (step, &timestamp) in timestamps.iter().enumerate() {
        let elapsed = timestamp - prev_timestamp;
        prev_timestamp = timestamp;

        let q = source.values_at(Q, step, None)?;
        if let Some(held) = &held_q {
            if !cum_source.is_aggregate() {
                cum_acc.update(held, elapsed);
            }
            if !cum_pos_source.is_aggregate() {
                cum_pos_acc.update(held, elapsed);
            }
            if !cum_neg_source.is_aggregate() {
                cum_neg_acc.update(held, elapsed);
            }
        }
        discharge_max.update_abs(&q);
        held_q = Some(q);

        let v = source.values_at(U1, step, None)?;
        velocity_max.update_abs(&v);

        let h = source.values_at(S1, step, None)?;
        let h_start = h.take_opt(&start_nodes)?;
        let h_end = h.take_opt(&end_nodes)?;

        // Head difference is only defined while both ends are wet.
        let mut diff = Vec::with_capacity(count);
        let mut diff_mask = Vec::with_capacity(count);
        for i in 0..count {
            match (h_start.get(i), h_end.get(i)) {
                (Some(s), Some(e)) => {
                    diff.push((s - e).abs());
                    diff_mask.push(false);
                }
                _ => {
                    diff.push(0.0);
                    diff_mask.push(true);
                }
            }
        }
        head_max.update(&MaskedArray::new(diff, diff_mask)?);

        level_max_start.update(&h_start);
        level_max_end.update(&h_end);
    }

    let q_end = source.values_at(Q, last_step, None)?;
    let v_end = source.values_at(U1, last_step, None)?;
    let h_last = source.values_at(S1, last_step, None)?;
    let level_end_start = h_last.take_opt(&start_nodes)?;
    let level_end_end = h_last.take_opt(&end_nodes)?;

    let cum = finalize_cum(source, &cum_source, cum_acc)?;
    let cum_pos = finalize_cum(source, &cum_pos_source, cum_pos_acc)?;
    let cum_neg = finalize_cum(source, &cum_neg_source, cum_neg_acc)?;

    let discharge_max = discharge_max.finalize();
    let velocity_max = velocity_max.finalize();
    let head_max = head_max.finalize();
    let level_max_start = level_max_start.finalize();
    let level_max_end = level_max_end.finalize();

    let mut rows = Vec::with_capacity(count);
    for (index, line) in flowlines.iter().enumerate() {
        rows.push(FlowlineStatsRow {
            id: index as i64,
            cum_discharge: round_opt(cum.get(index).copied().flatten(), 3),
            cum_discharge_positive: round_opt(cum_pos.get(index).copied().flatten(), 3),
            cum_discharge_negative: round_opt(cum_neg.get(index).copied().flatten(), 3),
            max_discharge: round_opt(discharge_max[index], 8),
            end_discharge: round_opt(q_end.get(index), 8),
            max_velocity: round_opt(velocity_max[index], 8),
            end_velocity: round_opt(v_end.get(index), 8),
            max_waterlevel_head: round_opt(head_max[index], 4),
            max_waterlevel_start: round_opt(level_max_start[index], 3),
            max_waterlevel_end: round_opt(level_max_end[index], 3),
            end_waterlevel_start: round_opt(level_end_start.get(index), 3),
            end_waterlevel_end: round_opt(level_end_end.get(index), 3),
            abs_length: round_opt(line.length_m, 3),
        });
    }

    provenance.record_raw("flowline_stats", "max_discharge", Q);
    provenance.record_raw("flowline_stats", "end_discharge", Q);
    provenance.record_raw("flowline_stats", "max_velocity", U1);
    provenance.record_raw("flowline_stats", "end_velocity", U1);
    provenance.record_raw("flowline_stats", "max_waterlevel_head", S1);
    provenance.record_raw("flowline_stats", "max_waterlevel_start", S1);
    provenance.record_raw("flowline_stats", "max_waterlevel_end", S1);
    provenance.record_raw("flowline_stats", "end_waterlevel_start", S1);
    provenance.record_raw("flowline_stats", "end_waterlevel_end", S1);
    provenance.record_raw("pipe_stats", "max_filling", S1);
    provenance.record_raw("pipe_stats", "end_filling", S1);
    provenance.record_raw("pipe_stats", "max_hydro_gradient", S1);
    provenance.record_raw("weir_stats", "max_overfall_height", S1);
    provenance.record("flowline_stats", "cum_discharge", &cum_source);
    provenance.record("weir_stats", "perc_volume", &cum_source);
    provenance.record("flowline_stats", "cum_discharge_positive", &cum_pos_source);
    provenance.record("weir_stats", "perc_volume_positive", &cum_pos_source);
    provenance.record("flowline_stats", "cum_discharge_negative", &cum_neg_source);
    provenance.record("weir_stats", "perc_volume_negative", &cum_neg_source);

    Ok(rows)
}

/// Final cumulative values, from the aggregate's last step or from the
/// accumulator fed during the run.
fn finalize_cum(
    source: &dyn ResultSource,
    metric: &MetricSource,
    accumulated: CumulativeSum,
) -> StatsResult<Vec<Option<f64>>> {
    match metric {
        MetricSource::Aggregate { parameter } => {
            Ok(read_aggregate_final(source, parameter, None)?.iter().collect())
        }
        MetricSource::Accumulated { .. } => {
            Ok(accumulated.finalize().into_iter().map(Some).collect())
        }
    }
}
