//! Pipe and weir statistics.
//!
//! Both tables are built in two stages. The base rows carry model
//! attributes and are written together with the flowline pass; the
//! derived fields (fillings, gradient, volume percentages, overfall)
//! are computed afterwards against the stored flowline figures, so they
//! agree with what a reader of `flowline_stats` sees.

use std::collections::HashMap;

use hs_core::round_opt;
use hs_model::NetworkModel;
use hs_store::{FlowlineStatsRow, PipeStatsRow, WeirStatsRow};
use tracing::{info, warn};

use crate::derive::{hydraulic_gradient, overfall_height, percentage_of, span_filling};
use crate::mapper::IdIndexMap;

/// Base `pipe_stats` rows: model attributes keyed by the pipe's
/// flowline-axis position. Pipes absent from the run are reported and
/// left out.
pub fn build_pipe_stats(model: &NetworkModel, lines: &IdIndexMap) -> Vec<PipeStatsRow> {
    let mut rows = Vec::with_capacity(model.pipes.len());
    for pipe in &model.pipes {
        let Some(index) = lines.get(pipe.line_id) else {
            warn!(id = %pipe.line_id, "no result for pipe, skipping");
            continue;
        };
        rows.push(PipeStatsRow {
            id: index as i64,
            code: pipe.code.clone(),
            display_name: pipe.display_name.clone(),
            sewerage_type: pipe.sewerage_type,
            invert_level_start: pipe.invert_level_start,
            invert_level_end: pipe.invert_level_end,
            profile_height: pipe
                .cross_section
                .as_ref()
                .and_then(|cs| cs.profile_height()),
            max_hydro_gradient: None,
            max_filling: None,
            end_filling: None,
        });
    }
    info!(
        pipes = rows.len(),
        skipped = model.pipes.len() - rows.len(),
        "built pipe base rows"
    );
    rows
}

/// Base `weir_stats` rows, keyed like the pipe rows.
pub fn build_weir_stats(model: &NetworkModel, lines: &IdIndexMap) -> Vec<WeirStatsRow> {
    let mut rows = Vec::with_capacity(model.weirs.len());
    for weir in &model.weirs {
        let Some(index) = lines.get(weir.line_id) else {
            warn!(id = %weir.line_id, "no result for weir, skipping");
            continue;
        };
        rows.push(WeirStatsRow {
            id: index as i64,
            code: weir.code.clone(),
            display_name: weir.display_name.clone(),
            crest_level: weir.crest_level,
            perc_volume: None,
            perc_volume_positive: None,
            perc_volume_negative: None,
            max_overfall_height: None,
        });
    }
    info!(
        weirs = rows.len(),
        skipped = model.weirs.len() - rows.len(),
        "built weir base rows"
    );
    rows
}

fn by_id(flowlines: &[FlowlineStatsRow]) -> HashMap<i64, &FlowlineStatsRow> {
    flowlines.iter().map(|row| (row.id, row)).collect()
}

/// Fills the gradient and filling fields of the pipe rows from the
/// stored flowline figures.
pub fn derive_pipe_stats(pipes: &mut [PipeStatsRow], flowlines: &[FlowlineStatsRow]) {
    let lines = by_id(flowlines);
    for pipe in pipes {
        let Some(line) = lines.get(&pipe.id) else {
            warn!(id = pipe.id, "pipe has no flowline statistics row");
            continue;
        };
        pipe.max_hydro_gradient = round_opt(
            hydraulic_gradient(line.max_waterlevel_head, line.abs_length),
            3,
        );
        pipe.max_filling = round_opt(
            span_filling(
                line.max_waterlevel_start,
                line.max_waterlevel_end,
                pipe.invert_level_start,
                pipe.invert_level_end,
                pipe.profile_height,
            ),
            3,
        );
        pipe.end_filling = round_opt(
            span_filling(
                line.end_waterlevel_start,
                line.end_waterlevel_end,
                pipe.invert_level_start,
                pipe.invert_level_end,
                pipe.profile_height,
            ),
            3,
        );
    }
}

/// Fills the volume percentages and overfall height of the weir rows.
///
/// Percentages are relative to the busiest weir of the run: the largest
/// cumulative discharge by magnitude for the total, the largest raw
/// value for each directional split.
pub fn derive_weir_stats(weirs: &mut [WeirStatsRow], flowlines: &[FlowlineStatsRow]) {
    let lines = by_id(flowlines);

    let mut max_cum: Option<f64> = None;
    let mut max_cum_pos: Option<f64> = None;
    let mut max_cum_neg: Option<f64> = None;
    for weir in weirs.iter() {
        let Some(line) = lines.get(&weir.id) else {
            continue;
        };
        if let Some(cum) = line.cum_discharge {
            let cum = cum.abs();
            max_cum = Some(max_cum.map_or(cum, |best| best.max(cum)));
        }
        if let Some(cum) = line.cum_discharge_positive {
            max_cum_pos = Some(max_cum_pos.map_or(cum, |best| best.max(cum)));
        }
        if let Some(cum) = line.cum_discharge_negative {
            max_cum_neg = Some(max_cum_neg.map_or(cum, |best| best.max(cum)));
        }
    }

    for weir in weirs {
        let Some(line) = lines.get(&weir.id) else {
            warn!(id = weir.id, "weir has no flowline statistics row");
            continue;
        };
        weir.perc_volume = round_opt(percentage_of(line.cum_discharge, max_cum), 2);
        weir.perc_volume_positive =
            round_opt(percentage_of(line.cum_discharge_positive, max_cum_pos), 2);
        weir.perc_volume_negative =
            round_opt(percentage_of(line.cum_discharge_negative, max_cum_neg), 2);
        weir.max_overfall_height = round_opt(
            overfall_height(
                line.max_waterlevel_start,
                line.max_waterlevel_end,
                weir.crest_level,
            ),
            3,
        );
    }
}
