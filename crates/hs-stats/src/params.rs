//! Result variable names as the result store publishes them.

/// Water level at nodes, m above datum.
pub const S1: &str = "s1";
/// Discharge through flowlines, m3/s.
pub const Q: &str = "q";
/// Flow velocity in flowlines, m/s.
pub const U1: &str = "u1";
/// Pump discharge, m3/s.
pub const Q_PUMP: &str = "q_pump";

/// Per-interval maximum water level, written by the solver on its own
/// aggregation axis.
pub const S1_MAX: &str = "s1_max";
/// Cumulative flowline discharge.
pub const Q_CUM: &str = "q_cum";
/// Cumulative positive-direction flowline discharge.
pub const Q_CUM_POSITIVE: &str = "q_cum_positive";
/// Cumulative negative-direction flowline discharge (as a magnitude).
pub const Q_CUM_NEGATIVE: &str = "q_cum_negative";
/// Cumulative pump discharge.
pub const Q_PUMP_CUM: &str = "q_pump_cum";
