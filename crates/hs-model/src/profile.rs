//! Profile height extraction from cross-section definitions.

use crate::schema::CrossSectionDef;

pub const SHAPE_RECTANGLE: i64 = 1;
pub const SHAPE_CIRCLE: i64 = 2;
pub const SHAPE_TABULATED_RECTANGLE: i64 = 5;
pub const SHAPE_TABULATED_TRAPEZIUM: i64 = 6;

impl CrossSectionDef {
    /// Vertical extent of the profile in metres, when the shape code is
    /// closed and its ordinate list yields a value. Open and unknown
    /// shapes have no height, so filling percentages stay unreported
    /// for pipes carrying them.
    pub fn profile_height(&self) -> Option<f64> {
        let ordinates = match self.shape? {
            SHAPE_RECTANGLE | SHAPE_CIRCLE => self.width.as_deref()?,
            SHAPE_TABULATED_RECTANGLE | SHAPE_TABULATED_TRAPEZIUM => self.height.as_deref()?,
            _ => return None,
        };
        max_ordinate(ordinates)
    }
}

/// Largest parseable value in a space-separated ordinate list. Compares
/// numerically, so "10.0" beats "0.9". Unparseable tokens are skipped.
fn max_ordinate(list: &str) -> Option<f64> {
    list.split_whitespace()
        .filter_map(|token| token.parse::<f64>().ok())
        .fold(None, |best, v| match best {
            Some(b) if b >= v => Some(b),
            _ => Some(v),
        })
}
