//! Pump statistics over the pump axis.
//!
//! Pump discharge is one-directional, so maxima are taken on the raw
//! sign. Capacity comes from the model in l/s and is reported in m3/s;
//! the derived duration and percentage fields need a usable capacity
//! and stay unknown without one.

use hs_core::{SECONDS_PER_HOUR, round_opt};
use hs_model::NetworkModel;
use hs_series::{MaskedArray, ResultSource};
use hs_store::PumpStatsRow;
use tracing::{info, warn};

use crate::accumulator::{CumulativeSum, RunningMax, SignClip};
use crate::mapper::IdIndexMap;
use crate::params::{Q_PUMP, Q_PUMP_CUM};
use crate::provenance::ProvenanceLog;
use crate::shortcut::{MetricSource, read_aggregate_final};
use crate::{StatsError, StatsResult};

/// Derives the `pump_stats` rows for one run. A run without a pump axis
/// produces no rows and no provenance.
pub fn calc_pump_stats(
    source: &dyn ResultSource,
    model: &NetworkModel,
    provenance: &mut ProvenanceLog,
) -> StatsResult<Vec<PumpStatsRow>> {
    let timestamps = source.timestamps();
    let last_step = timestamps
        .len()
        .checked_sub(1)
        .ok_or(StatsError::EmptyTimeAxis)?;

    let pump_count = source.pump_count();
    if pump_count == 0 || !source.has_variable(Q_PUMP) {
        if !model.pumps.is_empty() {
            warn!(
                pumps = model.pumps.len(),
                "model has pumps but the run carries no pump results"
            );
        }
        return Ok(Vec::new());
    }
    info!(pump_count, "calculating pump statistics");

    let positions = IdIndexMap::from_pump_positions(source.pump_index_map(), pump_count);

    let cum_source = MetricSource::resolve(source, Q_PUMP_CUM, Q_PUMP);
    let mut cum_acc = CumulativeSum::new(pump_count, SignClip::Total);
    let mut discharge_max = RunningMax::new(pump_count);

    let mut held_q: Option<MaskedArray> = None;
    let mut prev_timestamp = 0.0;
    for (step, &timestamp) in timestamps.iter().enumerate() {
        let elapsed = timestamp - prev_timestamp;
        prev_timestamp = timestamp;

        let q = source.values_at(Q_PUMP, step, None)?;
        if let Some(held) = &held_q {
            if !cum_source.is_aggregate() {
                cum_acc.update(held, elapsed);
            }
        }
        discharge_max.update(&q);
        held_q = Some(q);
    }

    let q_end = source.values_at(Q_PUMP, last_step, None)?;
    let discharge_max = discharge_max.finalize();
    let cum: Vec<Option<f64>> = match cum_source {
        MetricSource::Aggregate { parameter } => {
            read_aggregate_final(source, parameter, None)?.iter().collect()
        }
        MetricSource::Accumulated { .. } => {
            cum_acc.finalize().into_iter().map(Some).collect()
        }
    };

    let mut rows = Vec::with_capacity(model.pumps.len());
    for pump in &model.pumps {
        let Some(index) = positions.get(pump.pump_id) else {
            warn!(id = %pump.pump_id, "no result for pump, skipping");
            continue;
        };

        let capacity = pump.capacity_l_s.map(|c| c / 1000.0);
        let usable_capacity = capacity.filter(|c| *c > 0.0);
        let cum = cum.get(index).copied().flatten();
        let q_max = discharge_max.get(index).copied().flatten();
        let q_end = q_end.get(index);

        rows.push(PumpStatsRow {
            id: index as i64,
            model_id: pump.pump_id.raw(),
            code: pump.code.clone(),
            display_name: pump.display_name.clone(),
            capacity,
            cum_discharge: round_opt(cum, 3),
            end_discharge: round_opt(q_end, 8),
            max_discharge: round_opt(q_max, 8),
            duration_at_capacity: round_opt(
                cum.zip(usable_capacity)
                    .map(|(volume, capacity)| volume / capacity / SECONDS_PER_HOUR),
                3,
            ),
            perc_max_discharge: round_opt(
                q_max
                    .zip(usable_capacity)
                    .map(|(q, capacity)| 100.0 * q / capacity),
                2,
            ),
            perc_end_discharge: round_opt(
                q_end
                    .zip(usable_capacity)
                    .map(|(q, capacity)| 100.0 * q / capacity),
                2,
            ),
        });
    }

    provenance.record_raw("pump_stats", "end_discharge", Q_PUMP);
    provenance.record_raw("pump_stats", "max_discharge", Q_PUMP);
    provenance.record_raw("pump_stats", "perc_end_discharge", Q_PUMP);
    provenance.record("pump_stats", "cum_discharge", &cum_source);
    provenance.record("pump_stats", "duration_at_capacity", &cum_source);
    provenance.record("pump_stats", "perc_max_discharge", &cum_source);

    Ok(rows)
}
