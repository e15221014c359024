//! Least-squares line for scatter-plot overlays
//!
//! Fits `y = a + b·x` by solving the 2x2 normal equations on centered x, so
//! large offsets such as epoch timestamps keep their precision. Rows where
//! either coordinate is missing are dropped before fitting.
//!
//! The fit also carries the Pearson correlation and its two-sided p-value
//! under the null of zero correlation, from a t test on `n - 2` degrees of
//! freedom.

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::{StatsError, StatsResult};
use crate::summary::is_missing;

/// A fitted regression line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionLine {
    /// a
    pub intercept: f64,
    /// b
    pub slope: f64,
    /// Rows used in the fit
    pub n: usize,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Pearson correlation of the fitted rows; 0 when y is constant
    pub correlation: f64,
    /// Two-sided p-value for `correlation`; 1 when there are no residual
    /// degrees of freedom
    pub p_value: f64,
}

impl RegressionLine {
    /// Value of the line at `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// x at which the line reaches `y`, if the line is not flat
    pub fn solve_x(&self, y: f64) -> Option<f64> {
        if self.slope == 0.0 {
            None
        } else {
            Some((y - self.intercept) / self.slope)
        }
    }

    /// (a, b)
    pub fn coefficients(&self) -> (f64, f64) {
        (self.intercept, self.slope)
    }
}

/// Fit an ordinary least-squares line through parallel `x`, `y` arrays
pub fn fit_line(x: &[f64], y: &[f64]) -> StatsResult<RegressionLine> {
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }

    let pairs: Vec<(f64, f64)> = x
        .iter()
        .copied()
        .zip(y.iter().copied())
        .filter(|(a, b)| !is_missing(*a) && !is_missing(*b))
        .collect();

    let n = pairs.len();
    if n < 2 {
        return Err(StatsError::singular(format!(
            "need at least 2 complete rows, got {}",
            n
        )));
    }

    let count = n as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / count;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / count;

    let first = pairs[0].0;
    if pairs.iter().all(|p| p.0 == first) {
        return Err(StatsError::singular("x has zero variance"));
    }

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for &(px, py) in &pairs {
        let dx = px - mean_x;
        let dy = py - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx == 0.0 {
        return Err(StatsError::singular("x has zero variance"));
    }

    // Centered design [1, x - mean_x] makes XᵀX diagonal
    let xtx = Matrix2::new(count, 0.0, 0.0, sxx);
    let xty = Vector2::new(count * mean_y, sxy);
    let inverse = xtx
        .try_inverse()
        .ok_or_else(|| StatsError::singular("normal equations are singular"))?;
    let beta = inverse * xty;
    let slope = beta[1];
    let intercept = beta[0] - slope * mean_x;

    let ss_res: f64 = pairs
        .iter()
        .map(|p| (p.1 - (intercept + slope * p.0)).powi(2))
        .sum();
    let r_squared = if syy == 0.0 { 1.0 } else { 1.0 - ss_res / syy };

    let correlation = if syy == 0.0 {
        0.0
    } else {
        (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
    };
    let p_value = correlation_p_value(correlation, n)?;

    Ok(RegressionLine {
        intercept,
        slope,
        n,
        r_squared,
        correlation,
        p_value,
    })
}

/// Two-sided p-value of `r` against zero correlation with `n` rows
pub fn correlation_p_value(r: f64, n: usize) -> StatsResult<f64> {
    if n <= 2 {
        return Ok(1.0);
    }
    let remaining = 1.0 - r * r;
    if remaining <= 0.0 {
        return Ok(0.0);
    }

    let df = (n - 2) as f64;
    let t = r * (df / remaining).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| StatsError::InvalidDistribution(e.to_string()))?;
    Ok((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}
