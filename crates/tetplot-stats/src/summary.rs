//! Summary statistics and plot ranges
//!
//! Every function here skips missing values (NaN, ±infinity):
//! - Mean, variance, standard deviation
//! - Min, max, median
//! - The (min, max) plot range of a sample

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};

/// Whether a value is one of the missing sentinels
pub fn is_missing(value: f64) -> bool {
    !value.is_finite()
}

/// Copy the non-missing values of a sample, preserving order
pub fn non_missing(data: &[f64]) -> Vec<f64> {
    data.iter().copied().filter(|x| !is_missing(*x)).collect()
}

/// Summary statistics for a numeric sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Number of non-missing values
    pub count: usize,
    /// Number of missing values
    pub missing: usize,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Mean (average)
    pub mean: f64,
    /// Sample variance (n - 1 denominator; 0 for a single value)
    pub variance: f64,
    /// Sample standard deviation
    pub std_dev: f64,
    /// Median (50th percentile)
    pub median: f64,
}

impl SummaryStats {
    /// Compute summary statistics from data
    pub fn from_data(data: &[f64]) -> Self {
        let finite = non_missing(data);
        let missing = data.len() - finite.len();

        if finite.is_empty() {
            return Self::empty(missing);
        }

        let count = finite.len();
        let mean = finite.iter().sum::<f64>() / count as f64;

        let variance = if count > 1 {
            finite.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();

        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut sorted = finite;
        sorted.sort_by(f64::total_cmp);

        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        Self {
            count,
            missing,
            min,
            max,
            mean,
            variance,
            std_dev,
            median,
        }
    }

    /// Create empty statistics (all NaN)
    fn empty(missing: usize) -> Self {
        Self {
            count: 0,
            missing,
            min: f64::NAN,
            max: f64::NAN,
            mean: f64::NAN,
            variance: f64::NAN,
            std_dev: f64::NAN,
            median: f64::NAN,
        }
    }

    /// Whether no value survived the missing filter
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Get the range (max - min)
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// The plot range, if the sample had any non-missing values
    pub fn plot_range(&self) -> Option<PlotRange> {
        if self.is_empty() {
            None
        } else {
            Some(PlotRange {
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// The (min, max) pair an axis spans for a sample
///
/// Invariant: `min <= max`. `from_sample` only yields finite bounds; `new`
/// orders the bounds it is given without checking them, and a NaN bound
/// is replaced by the other one. Two NaN bounds give a NaN range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotRange {
    pub min: f64,
    pub max: f64,
}

impl PlotRange {
    /// Build a range from explicit bounds, swapping them if reversed
    pub fn new(a: f64, b: f64) -> Self {
        let (a, b) = match (a.is_nan(), b.is_nan()) {
            (true, false) => (b, b),
            (false, true) => (a, a),
            _ => (a, b),
        };
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// Compute the range over the non-missing values of a sample
    pub fn from_sample(data: &[f64]) -> StatsResult<Self> {
        let mut values = data.iter().copied().filter(|x| !is_missing(*x));
        let first = values.next().ok_or(StatsError::EmptySample)?;
        let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Ok(Self { min, max })
    }

    /// Width of the range
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Whether min and max coincide
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    /// Closed-interval membership
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Smallest range covering both
    pub fn union(&self, other: &PlotRange) -> PlotRange {
        PlotRange {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}
