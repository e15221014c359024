//! Fitted-normal quantiles for Q-Q plots
//!
//! The inverse CDF is found by bisection rather than a closed form: the
//! search narrows `[low, high]` until the CDF at the midpoint is within
//! `precision` of the target probability. Hitting the iteration cap is not
//! an error; the last midpoint is returned and flagged as unconverged.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{StatsError, StatsResult};
use crate::normal::FittedNormal;
use crate::summary::{non_missing, PlotRange};

/// Default tolerance on |CDF(x) - q|
pub const DEFAULT_QUANTILE_PRECISION: f64 = 1e-6;

/// Default bisection step cap
pub const DEFAULT_QUANTILE_MAX_ITERATIONS: usize = 60;

/// Default half-width of the search interval, in standard deviations
pub const DEFAULT_SEARCH_WIDTH_SD: f64 = 8.0;

/// Bisection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileSearch {
    pub precision: f64,
    pub max_iterations: usize,
}

impl Default for QuantileSearch {
    fn default() -> Self {
        Self {
            precision: DEFAULT_QUANTILE_PRECISION,
            max_iterations: DEFAULT_QUANTILE_MAX_ITERATIONS,
        }
    }
}

/// Outcome of one quantile search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantileEstimate {
    /// The located x (best midpoint when unconverged)
    pub value: f64,
    /// Bisection steps taken
    pub iterations: usize,
    /// Whether |CDF(value) - q| < precision
    pub converged: bool,
}

impl QuantileSearch {
    pub fn new(precision: f64, max_iterations: usize) -> Self {
        Self {
            precision,
            max_iterations,
        }
    }

    /// Find x in `[low, high]` with `CDF(x) ≈ q`
    ///
    /// Bounds given in reverse order are swapped.
    pub fn find(
        &self,
        q: f64,
        dist: &FittedNormal,
        low: f64,
        high: f64,
    ) -> StatsResult<QuantileEstimate> {
        if !(q > 0.0 && q < 1.0) {
            return Err(StatsError::InvalidProbability(q));
        }

        let (mut low, mut high) = if low <= high { (low, high) } else { (high, low) };
        let mut mid = low + (high - low) / 2.0;

        for iteration in 1..=self.max_iterations {
            mid = low + (high - low) / 2.0;
            let p = dist.cdf(mid);

            if (p - q).abs() < self.precision {
                return Ok(QuantileEstimate {
                    value: mid,
                    iterations: iteration,
                    converged: true,
                });
            }

            if p < q {
                low = mid;
            } else {
                high = mid;
            }
        }

        trace!(q, mid, cap = self.max_iterations, "quantile search hit iteration cap");
        Ok(QuantileEstimate {
            value: mid,
            iterations: self.max_iterations,
            converged: false,
        })
    }
}

/// Sample values paired with fitted-normal quantiles of the same rank
#[derive(Debug, Clone)]
pub struct QuantileTable {
    /// Sorted non-missing sample values
    observed: Vec<f64>,
    /// Fitted-normal quantile for each rank, non-decreasing
    theoretical: Vec<f64>,
    distribution: FittedNormal,
    unconverged: usize,
}

impl QuantileTable {
    /// Build the table for a sample
    ///
    /// Rank `i` of `n` is assigned probability `(i + 1) / (n + 1)`. The search
    /// interval covers the sample range and `search_width` standard deviations
    /// either side of the mean.
    pub fn build(sample: &[f64], search: &QuantileSearch, search_width: f64) -> StatsResult<Self> {
        let mut observed = non_missing(sample);
        if observed.is_empty() {
            return Err(StatsError::EmptySample);
        }
        observed.sort_by(f64::total_cmp);

        let distribution = FittedNormal::fit(&observed)?;
        let sample_range = PlotRange::new(observed[0], observed[observed.len() - 1]);
        let reach = search_width.abs() * distribution.std_dev();
        let bounds = sample_range.union(&PlotRange::new(
            distribution.mean() - reach,
            distribution.mean() + reach,
        ));

        let n = observed.len() as f64;
        let mut theoretical = Vec::with_capacity(observed.len());
        let mut unconverged = 0;
        let mut previous = f64::NEG_INFINITY;

        for i in 0..observed.len() {
            let q = (i as f64 + 1.0) / (n + 1.0);
            let estimate = search.find(q, &distribution, bounds.min, bounds.max)?;
            if !estimate.converged {
                unconverged += 1;
            }
            // Neighbouring probabilities closer than the precision may come back
            // out of order.
            let value = estimate.value.max(previous);
            theoretical.push(value);
            previous = value;
        }

        Ok(Self {
            observed,
            theoretical,
            distribution,
            unconverged,
        })
    }

    pub fn observed(&self) -> &[f64] {
        &self.observed
    }

    pub fn theoretical(&self) -> &[f64] {
        &self.theoretical
    }

    pub fn distribution(&self) -> &FittedNormal {
        &self.distribution
    }

    /// Number of ranks whose search hit the iteration cap
    pub fn unconverged(&self) -> usize {
        self.unconverged
    }

    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// (theoretical, observed) pairs in rank order
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.theoretical
            .iter()
            .copied()
            .zip(self.observed.iter().copied())
            .collect()
    }
}
