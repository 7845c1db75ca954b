//! Streaming accumulators over one result axis.
//!
//! Each accumulator holds one slot per element and folds in whole
//! timesteps as they arrive, so a full run is reduced in a single pass
//! without materialising the series. Masked samples leave their slot
//! untouched for that step.

use hs_series::MaskedArray;

/// Elementwise running maximum. A slot that never sees a valid sample
/// finalizes to `None` rather than an arbitrary floor value.
#[derive(Debug, Clone)]
pub struct RunningMax {
    best: Vec<Option<f64>>,
}

impl RunningMax {
    pub fn new(len: usize) -> Self {
        Self {
            best: vec![None; len],
        }
    }

    /// Fold in one step of samples, comparing raw values.
    pub fn update(&mut self, samples: &MaskedArray) {
        for (slot, sample) in self.best.iter_mut().zip(samples.iter()) {
            if let Some(value) = sample {
                *slot = Some(match *slot {
                    Some(best) => best.max(value),
                    None => value,
                });
            }
        }
    }

    /// Fold in one step of samples, comparing magnitudes. Used for
    /// discharge and velocity where direction is not of interest.
    pub fn update_abs(&mut self, samples: &MaskedArray) {
        for (slot, sample) in self.best.iter_mut().zip(samples.iter()) {
            if let Some(value) = sample {
                let value = value.abs();
                *slot = Some(match *slot {
                    Some(best) => best.max(value),
                    None => value,
                });
            }
        }
    }

    pub fn finalize(self) -> Vec<Option<f64>> {
        self.best
    }
}

/// Which part of a signed sample a [`CumulativeSum`] integrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignClip {
    /// Integrate the sample as is.
    Total,
    /// Integrate only positive samples.
    PositiveOnly,
    /// Integrate the magnitude of negative samples.
    NegativeOnly,
}

impl SignClip {
    fn apply(self, value: f64) -> f64 {
        match self {
            SignClip::Total => value,
            SignClip::PositiveOnly => value.max(0.0),
            SignClip::NegativeOnly => (-value).max(0.0),
        }
    }
}

/// Elementwise cumulative sum of `sample * elapsed` over the run. The
/// caller feeds the sample that was in force across the elapsed
/// interval, so the fold is a left rectangle rule. Masked samples
/// contribute nothing. Totals start at zero: an element that is dry for
/// the whole run accumulates a genuine zero, unlike an extremum.
#[derive(Debug, Clone)]
pub struct CumulativeSum {
    clip: SignClip,
    totals: Vec<f64>,
}

impl CumulativeSum {
    pub fn new(len: usize, clip: SignClip) -> Self {
        Self {
            clip,
            totals: vec![0.0; len],
        }
    }

    pub fn update(&mut self, samples: &MaskedArray, elapsed: f64) {
        for (total, sample) in self.totals.iter_mut().zip(samples.iter()) {
            if let Some(value) = sample {
                *total += self.clip.apply(value) * elapsed;
            }
        }
    }

    pub fn finalize(self) -> Vec<f64> {
        self.totals
    }
}

/// Elementwise time spent at or above a per-element threshold. Elements
/// whose threshold is unknown finalize to `None`; there is nothing to
/// measure against.
#[derive(Debug, Clone)]
pub struct ThresholdDuration {
    thresholds: Vec<Option<f64>>,
    seconds: Vec<f64>,
}

impl ThresholdDuration {
    pub fn new(thresholds: Vec<Option<f64>>) -> Self {
        let seconds = vec![0.0; thresholds.len()];
        Self {
            thresholds,
            seconds,
        }
    }

    pub fn update(&mut self, samples: &MaskedArray, elapsed: f64) {
        for ((seconds, threshold), sample) in self
            .seconds
            .iter_mut()
            .zip(self.thresholds.iter())
            .zip(samples.iter())
        {
            let (Some(threshold), Some(value)) = (threshold, sample) else {
                continue;
            };
            if value >= *threshold {
                *seconds += elapsed;
            }
        }
    }

    pub fn finalize(self) -> Vec<Option<f64>> {
        self.seconds
            .into_iter()
            .zip(self.thresholds)
            .map(|(seconds, threshold)| threshold.map(|_| seconds))
            .collect()
    }
}
