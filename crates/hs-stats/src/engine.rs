//! One statistics run: every pass in order, against one store.

use hs_model::NetworkModel;
use hs_series::{FlowlineKind, ResultSource};
use hs_store::StatsStore;
use tracing::info;

use crate::flowline_stats::calc_flowline_stats;
use crate::mapper::IdIndexMap;
use crate::node_stats::calc_manhole_stats;
use crate::pipe_weir_stats::{
    build_pipe_stats, build_weir_stats, derive_pipe_stats, derive_weir_stats,
};
use crate::provenance::{ProvenanceLog, average_timestep};
use crate::pump_stats::calc_pump_stats;
use crate::{StatsError, StatsResult};

/// Row counts of one finished statistics run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSummary {
    pub manholes: usize,
    pub flowlines: usize,
    pub pipes: usize,
    pub weirs: usize,
    pub pumps: usize,
    pub sources: usize,
}

/// Runs every statistics pass against `source` and replaces the
/// contents of `store` with the outcome.
///
/// The pipe and weir derivations deliberately read the flowline figures
/// back from the store, so they are computed from the same rounded
/// values a reader of `flowline_stats` sees.
pub fn run_statistics(
    source: &dyn ResultSource,
    model: &NetworkModel,
    store: &mut StatsStore,
) -> StatsResult<StatsSummary> {
    let timestamps = source.timestamps();
    if timestamps.is_empty() {
        return Err(StatsError::EmptyTimeAxis);
    }
    info!(
        steps = timestamps.len(),
        nodes = source.node_count(),
        flowlines = source.flowline_count(),
        pumps = source.pump_count(),
        "starting statistics run"
    );

    let mut provenance = ProvenanceLog::new(average_timestep(timestamps));

    let manholes = calc_manhole_stats(source, model, &mut provenance)?;
    store.replace_manhole_stats(&manholes)?;

    let flowlines = calc_flowline_stats(source, &mut provenance)?;
    store.replace_flowline_stats(&flowlines)?;

    let pipe_lines = IdIndexMap::from_flowlines(source.flowlines(), FlowlineKind::Pipe);
    let pipes = build_pipe_stats(model, &pipe_lines);
    store.replace_pipe_stats(&pipes)?;

    let weir_lines = IdIndexMap::from_flowlines(source.flowlines(), FlowlineKind::Weir);
    let weirs = build_weir_stats(model, &weir_lines);
    store.replace_weir_stats(&weirs)?;

    let stored_flowlines = store.load_flowline_stats()?;
    let mut stored_pipes = store.load_pipe_stats()?;
    derive_pipe_stats(&mut stored_pipes, &stored_flowlines);
    store.update_pipe_derived(&stored_pipes)?;

    let mut stored_weirs = store.load_weir_stats()?;
    derive_weir_stats(&mut stored_weirs, &stored_flowlines);
    store.update_weir_derived(&stored_weirs)?;

    let pumps = calc_pump_stats(source, model, &mut provenance)?;
    store.replace_pump_stats(&pumps)?;

    let sources = provenance.into_rows();
    store.upsert_stat_sources(&sources)?;

    let summary = StatsSummary {
        manholes: manholes.len(),
        flowlines: flowlines.len(),
        pipes: stored_pipes.len(),
        weirs: stored_weirs.len(),
        pumps: pumps.len(),
        sources: sources.len(),
    };
    info!(
        manholes = summary.manholes,
        flowlines = summary.flowlines,
        pipes = summary.pipes,
        weirs = summary.weirs,
        pumps = summary.pumps,
        sources = summary.sources,
        "statistics run finished"
    );
    Ok(summary)
}
