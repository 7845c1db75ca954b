//! Derivation formulas applied after the time loop.
//!
//! Every function here is total over unknown inputs: a missing level,
//! length or capacity makes the derived value unknown instead of
//! failing the run. Results are returned at full precision; the row
//! builders round once at write time.

use hs_core::{Tolerances, clip, nearly_equal};

/// Filling of a vertical element as a percentage of the span between
/// `floor` and `ceiling`, clamped into `[0, 100]`. Unknown when either
/// bound is missing or the span is not positive.
pub fn filling_percentage(
    level: Option<f64>,
    floor: Option<f64>,
    ceiling: Option<f64>,
) -> Option<f64> {
    let (level, floor, ceiling) = (level?, floor?, ceiling?);
    let span = ceiling - floor;
    if span <= 0.0 {
        return None;
    }
    Some(100.0 * clip((level - floor) / span, 0.0, 1.0))
}

/// Filling of a sloped conduit: the two end fillings against their own
/// invert levels, each clamped into `[0, 1]`, averaged. Unknown when
/// any input is missing or the profile height is not positive.
pub fn span_filling(
    start_level: Option<f64>,
    end_level: Option<f64>,
    invert_start: Option<f64>,
    invert_end: Option<f64>,
    profile_height: Option<f64>,
) -> Option<f64> {
    let (start_level, end_level) = (start_level?, end_level?);
    let (invert_start, invert_end) = (invert_start?, invert_end?);
    let height = profile_height?;
    if height <= 0.0 {
        return None;
    }
    let fill_start = clip((start_level - invert_start) / height, 0.0, 1.0);
    let fill_end = clip((end_level - invert_end) / height, 0.0, 1.0);
    Some(100.0 * (fill_start + fill_end) / 2.0)
}

/// Head loss over a conduit in cm per metre of length. Unknown when the
/// head or length is missing or the length is not positive.
pub fn hydraulic_gradient(head: Option<f64>, length: Option<f64>) -> Option<f64> {
    let (head, length) = (head?, length?);
    if length <= 0.0 {
        return None;
    }
    Some(100.0 * head / length)
}

/// `value` as a percentage of `reference`. Unknown when either side is
/// missing or the reference is indistinguishable from zero.
pub fn percentage_of(value: Option<f64>, reference: Option<f64>) -> Option<f64> {
    let (value, reference) = (value?, reference?);
    if nearly_equal(reference, 0.0, Tolerances::default()) {
        return None;
    }
    Some(100.0 * value / reference)
}

/// Height of the highest known endpoint level above the crest. Unknown
/// when neither endpoint was ever observed or the crest is missing.
pub fn overfall_height(
    max_start: Option<f64>,
    max_end: Option<f64>,
    crest_level: Option<f64>,
) -> Option<f64> {
    let crest = crest_level?;
    let highest = match (max_start, max_end) {
        (Some(a), Some(b)) => a.max(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };
    Some(highest - crest)
}
