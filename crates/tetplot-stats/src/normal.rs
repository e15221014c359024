//! Normal distribution fitted to a sample
//!
//! Q-Q plots compare a sample against the normal with the sample's own mean
//! and standard deviation.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{StatsError, StatsResult};
use crate::summary::SummaryStats;

/// A normal distribution with fixed mean and standard deviation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedNormal {
    mean: f64,
    std_dev: f64,
    dist: Normal,
}

impl FittedNormal {
    /// Create a distribution from explicit parameters
    pub fn new(mean: f64, std_dev: f64) -> StatsResult<Self> {
        let dist = Normal::new(mean, std_dev)
            .map_err(|e| StatsError::InvalidDistribution(e.to_string()))?;
        Ok(Self {
            mean,
            std_dev,
            dist,
        })
    }

    /// Fit mean and standard deviation over the non-missing values
    ///
    /// A zero standard deviation (constant sample) is replaced by 1.0.
    pub fn fit(sample: &[f64]) -> StatsResult<Self> {
        let stats = SummaryStats::from_data(sample);
        if stats.is_empty() {
            return Err(StatsError::EmptySample);
        }

        let std_dev = if stats.std_dev == 0.0 {
            1.0
        } else {
            stats.std_dev
        };
        Self::new(stats.mean, std_dev)
    }

    /// Cumulative probability at `x`
    pub fn cdf(&self, x: f64) -> f64 {
        self.dist.cdf(x)
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }
}
