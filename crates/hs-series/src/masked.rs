//! Per-element sample arrays with an explicit validity mask.
//!
//! Hydraulic solvers report no-data values for elements that are dry or
//! outside the active domain at a given step. Masked entries must never
//! feed an aggregate, so reads go through [`MaskedArray::get`] which
//! returns `None` for them.

use hs_core::numeric::{nearly_equal, Tolerances};
use serde::{Deserialize, Serialize};

use crate::{SeriesError, SeriesResult};

/// No-data marker conventionally written by solvers into raw result files.
pub const DRY_SENTINEL: f64 = -9999.0;

/// A vector of `f64` samples where individual entries may be missing.
///
/// An empty mask means every entry is valid; otherwise the mask has the
/// same length as the values and `true` marks a missing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskedArray {
    values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    mask: Vec<bool>,
}

impl MaskedArray {
    /// Array with every entry valid.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            values,
            mask: Vec::new(),
        }
    }

    /// Array with an explicit mask. The mask must be empty or match the
    /// value count.
    pub fn new(values: Vec<f64>, mask: Vec<bool>) -> SeriesResult<Self> {
        if !mask.is_empty() && mask.len() != values.len() {
            return Err(SeriesError::LengthMismatch {
                what: "mask".to_string(),
                expected: values.len(),
                got: mask.len(),
            });
        }
        Ok(Self { values, mask })
    }

    /// Builds the mask by matching entries against a no-data sentinel.
    /// NaN entries are masked as well.
    pub fn from_sentinel(values: Vec<f64>, sentinel: f64) -> Self {
        let tol = Tolerances::default();
        let mask = values
            .iter()
            .map(|&v| v.is_nan() || nearly_equal(v, sentinel, tol))
            .collect();
        Self { values, mask }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `true` when the entry exists and is masked out.
    pub fn is_masked(&self, index: usize) -> bool {
        self.mask.get(index).copied().unwrap_or(false)
    }

    /// The sample at `index`, or `None` when the entry is masked or the
    /// index is past the end.
    pub fn get(&self, index: usize) -> Option<f64> {
        if self.is_masked(index) {
            return None;
        }
        self.values.get(index).copied()
    }

    /// Iterates every entry in order, masked entries as `None`.
    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        (0..self.values.len()).map(|i| self.get(i))
    }

    /// Projects the array onto the given positions, preserving masks.
    /// An out-of-range position is an error.
    pub fn take(&self, indices: &[usize]) -> SeriesResult<MaskedArray> {
        let mut values = Vec::with_capacity(indices.len());
        let mut mask = Vec::with_capacity(indices.len());
        for &i in indices {
            if i >= self.values.len() {
                return Err(SeriesError::IndexOutOfRange {
                    index: i,
                    len: self.values.len(),
                });
            }
            values.push(self.values[i]);
            mask.push(self.is_masked(i));
        }
        Ok(MaskedArray { values, mask })
    }

    /// Like [`take`](Self::take), but a `None` position produces a masked
    /// entry instead of an error. Used when some elements have no valid
    /// mapping onto this axis.
    pub fn take_opt(&self, indices: &[Option<usize>]) -> SeriesResult<MaskedArray> {
        let mut values = Vec::with_capacity(indices.len());
        let mut mask = Vec::with_capacity(indices.len());
        for &slot in indices {
            match slot {
                Some(i) => {
                    if i >= self.values.len() {
                        return Err(SeriesError::IndexOutOfRange {
                            index: i,
                            len: self.values.len(),
                        });
                    }
                    values.push(self.values[i]);
                    mask.push(self.is_masked(i));
                }
                None => {
                    values.push(0.0);
                    mask.push(true);
                }
            }
        }
        Ok(MaskedArray { values, mask })
    }
}
