//! Shortcuts through pre-reduced aggregate variables.
//!
//! A result source may carry variables the solver already reduced over
//! time, such as a running water level maximum or a cumulative
//! discharge. When present they are authoritative and cheaper than
//! folding the raw series; when absent the engine accumulates from the
//! raw variable instead. The choice is made once per metric, before
//! the time loop, and recorded in the provenance table.

use hs_series::{MaskedArray, ResultSource};
use tracing::debug;

use crate::accumulator::RunningMax;
use crate::{StatsError, StatsResult};

/// Where one metric's numbers come from for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricSource {
    /// Read from a solver-side aggregate variable.
    Aggregate { parameter: &'static str },
    /// Accumulated here from a raw per-step variable.
    Accumulated { parameter: &'static str },
}

impl MetricSource {
    /// Prefer the aggregate variable when the source carries it, fall
    /// back to accumulating the raw one.
    pub fn resolve(
        source: &dyn ResultSource,
        aggregate: &'static str,
        fallback: &'static str,
    ) -> Self {
        if source.has_variable(aggregate) {
            debug!(parameter = aggregate, "using pre-reduced aggregate variable");
            MetricSource::Aggregate {
                parameter: aggregate,
            }
        } else {
            debug!(
                parameter = fallback,
                missing = aggregate,
                "aggregate variable absent, accumulating from raw series"
            );
            MetricSource::Accumulated {
                parameter: fallback,
            }
        }
    }

    /// The variable the metric is read or accumulated from.
    pub fn parameter(&self) -> &'static str {
        match self {
            MetricSource::Aggregate { parameter } => parameter,
            MetricSource::Accumulated { parameter } => parameter,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, MetricSource::Aggregate { .. })
    }
}

/// Final step of a cumulative aggregate variable, on that variable's
/// own time axis. Masked entries stay masked so the caller can store
/// them as unknown instead of a fabricated zero.
pub fn read_aggregate_final(
    source: &dyn ResultSource,
    parameter: &str,
    subset: Option<&[usize]>,
) -> StatsResult<MaskedArray> {
    let steps = source.aggregate_timestamps(parameter)?.len();
    if steps == 0 {
        return Err(StatsError::EmptyAggregate {
            parameter: parameter.to_owned(),
        });
    }
    Ok(source.values_at(parameter, steps - 1, subset)?)
}

/// Elementwise maximum over every step of an extremum aggregate
/// variable. The aggregate is itself a running reduction, but its
/// output interval need not end at the run's final step, so all steps
/// are folded rather than trusting the last one.
pub fn aggregate_running_max(
    source: &dyn ResultSource,
    parameter: &str,
    subset: Option<&[usize]>,
) -> StatsResult<RunningMax> {
    let steps = source.aggregate_timestamps(parameter)?.len();
    if steps == 0 {
        return Err(StatsError::EmptyAggregate {
            parameter: parameter.to_owned(),
        });
    }
    let first = source.values_at(parameter, 0, subset)?;
    let mut max = RunningMax::new(first.len());
    max.update(&first);
    for step in 1..steps {
        max.update(&source.values_at(parameter, step, subset)?);
    }
    Ok(max)
}

#[cfg(test)]
mod tests {
    use hs_series::MemorySourceBuilder;

    use super::*;

    #[test]
    fn resolve_prefers_the_aggregate_when_present() {
        let mut builder = MemorySourceBuilder::new(vec![0.0, 10.0]);
        builder.add_node(Some(1));
        builder.add_variable("s1", vec![vec![0.1], vec![0.2]]);
        builder.add_aggregate("s1_max", vec![300.0], vec![vec![0.2]]);
        let source = builder.build().expect("failed to build source");

        let max = MetricSource::resolve(&source, "s1_max", "s1");
        assert!(max.is_aggregate());
        assert_eq!(max.parameter(), "s1_max");

        let cum = MetricSource::resolve(&source, "q_cum", "q");
        assert!(!cum.is_aggregate());
        assert_eq!(cum.parameter(), "q");
    }

    #[test]
    fn aggregate_final_reads_the_last_step_of_its_own_axis() {
        let mut builder = MemorySourceBuilder::new(vec![0.0, 10.0, 20.0]);
        builder.add_node(Some(1));
        builder.add_variable("s1", vec![vec![0.0], vec![0.0], vec![0.0]]);
        builder.add_aggregate("q_cum", vec![900.0, 1800.0], vec![vec![4.0], vec![7.5]]);
        let source = builder.build().expect("failed to build source");

        let last = read_aggregate_final(&source, "q_cum", None).expect("failed to read aggregate");
        assert_eq!(last.get(0), Some(7.5));
    }

    #[test]
    fn aggregate_running_max_folds_every_step() {
        let mut builder = MemorySourceBuilder::new(vec![0.0, 10.0, 20.0]);
        builder.add_node(Some(1));
        builder.add_node(Some(2));
        builder.add_variable("s1", vec![vec![0.0; 2]; 3]);
        // The aggregate interval resets, so the overall maximum lives
        // in the first step for one element and the last for the other.
        builder.add_aggregate(
            "s1_max",
            vec![900.0, 1800.0],
            vec![vec![5.0, 1.0], vec![2.0, 3.0]],
        );
        let source = builder.build().expect("failed to build source");

        let max = aggregate_running_max(&source, "s1_max", None).expect("failed to fold aggregate");
        assert_eq!(max.finalize(), vec![Some(5.0), Some(3.0)]);
    }
}
