use crate::HsError;

/// Floating point type used throughout the engine.
pub type Real = f64;

/// Conversion factor for durations reported in hours.
pub const SECONDS_PER_HOUR: Real = 3600.0;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, HsError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(HsError::NonFinite { what, value: v })
    }
}

/// Round to a fixed number of decimal places.
///
/// Statistics are rounded exactly once, when the output row is built;
/// accumulators always carry full-precision values.
pub fn round_to(v: Real, decimals: u32) -> Real {
    let factor = 10f64.powi(decimals as i32);
    (v * factor).round() / factor
}

/// `round_to` lifted over optional values (NULL-able row fields).
pub fn round_opt(v: Option<Real>, decimals: u32) -> Option<Real> {
    v.map(|v| round_to(v, decimals))
}

/// Clamp into `[lo, hi]`.
pub fn clip(v: Real, lo: Real, hi: Real) -> Real {
    v.max(lo).min(hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn round_to_basic() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(-1.23444, 3), -1.234);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(0.123456789, 8), 0.12345679);
    }

    #[test]
    fn round_opt_passes_none() {
        assert_eq!(round_opt(None, 3), None);
        assert_eq!(round_opt(Some(1.2345), 2), Some(1.23));
    }

    #[test]
    fn clip_basic() {
        assert_eq!(clip(1.5, 0.0, 1.0), 1.0);
        assert_eq!(clip(-0.5, 0.0, 1.0), 0.0);
        assert_eq!(clip(0.5, 0.0, 1.0), 0.5);
    }

    proptest! {
        #[test]
        fn clip_stays_in_bounds(v in -1e6f64..1e6) {
            let c = clip(v, 0.0, 1.0);
            prop_assert!((0.0..=1.0).contains(&c));
        }

        #[test]
        fn round_to_is_idempotent(v in -1e6f64..1e6, d in 0u32..8) {
            let once = round_to(v, d);
            prop_assert_eq!(once, round_to(once, d));
        }
    }
}
