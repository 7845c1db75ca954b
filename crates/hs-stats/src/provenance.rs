//! Records where each statistic came from.
//!
//! Consumers of the store need to know whether a figure was read from a
//! solver-side aggregate or accumulated here from the raw series, and
//! at what output resolution. One row per (table, field) pair is
//! collected during the run and upserted at the end.

use hs_store::StatSourceRow;

use crate::shortcut::MetricSource;

/// Mean output interval of the run in seconds, `None` for a run with
/// fewer than two steps. Raw-series provenance rows carry this so a
/// reader can judge the resolution behind an accumulated figure.
pub fn average_timestep(timestamps: &[f64]) -> Option<f64> {
    let last = *timestamps.last()?;
    if timestamps.len() < 2 {
        return None;
    }
    Some(last / (timestamps.len() - 1) as f64)
}

/// Accumulates provenance rows for one statistics run.
#[derive(Debug, Clone)]
pub struct ProvenanceLog {
    avg_timestep: Option<f64>,
    rows: Vec<StatSourceRow>,
}

impl ProvenanceLog {
    pub fn new(avg_timestep: Option<f64>) -> Self {
        Self {
            avg_timestep,
            rows: Vec::new(),
        }
    }

    /// The field was accumulated here from a raw per-step variable.
    pub fn record_raw(&mut self, table: &str, field: &str, parameter: &str) {
        self.rows.push(StatSourceRow {
            table_name: table.to_owned(),
            field_name: field.to_owned(),
            input_param: parameter.to_owned(),
            from_aggregate: false,
            timestep: self.avg_timestep,
        });
    }

    /// The field was read from a solver-side aggregate variable, which
    /// carries its own axis.
    pub fn record_aggregate(&mut self, table: &str, field: &str, parameter: &str) {
        self.rows.push(StatSourceRow {
            table_name: table.to_owned(),
            field_name: field.to_owned(),
            input_param: parameter.to_owned(),
            from_aggregate: true,
            timestep: None,
        });
    }

    /// Record a field according to how its metric was resolved.
    pub fn record(&mut self, table: &str, field: &str, source: &MetricSource) {
        match source {
            MetricSource::Aggregate { parameter } => {
                self.record_aggregate(table, field, parameter);
            }
            MetricSource::Accumulated { parameter } => {
                self.record_raw(table, field, parameter);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<StatSourceRow> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_timestep_divides_the_span_evenly() {
        assert_eq!(average_timestep(&[0.0, 10.0, 20.0]), Some(10.0));
        // Uneven axes keep the fractional part.
        assert_eq!(average_timestep(&[0.0, 10.0, 25.0]), Some(12.5));
    }

    #[test]
    fn average_timestep_needs_two_steps() {
        assert_eq!(average_timestep(&[]), None);
        assert_eq!(average_timestep(&[42.0]), None);
    }

    #[test]
    fn record_dispatches_on_the_metric_source() {
        let mut log = ProvenanceLog::new(Some(10.0));
        log.record(
            "flowline_stats",
            "cum_discharge",
            &MetricSource::Aggregate { parameter: "q_cum" },
        );
        log.record(
            "flowline_stats",
            "max_discharge",
            &MetricSource::Accumulated { parameter: "q" },
        );
        let rows = log.into_rows();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].from_aggregate);
        assert_eq!(rows[0].timestep, None);
        assert_eq!(rows[0].input_param, "q_cum");
        assert!(!rows[1].from_aggregate);
        assert_eq!(rows[1].timestep, Some(10.0));
        assert_eq!(rows[1].input_param, "q");
    }
}
