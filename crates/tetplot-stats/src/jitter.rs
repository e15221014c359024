//! Point jitter against overplotting
//!
//! Discrete or heavily repeated values stack on the same pixel. Jitter adds
//! a small random offset scaled to the axis range so the stack spreads out.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

use crate::summary::{is_missing, PlotRange};

/// Fraction of the axis range used as the jitter scale
pub const DEFAULT_JITTER_FRACTION: f64 = 0.03;

/// How coordinates are perturbed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JitterMode {
    /// Coordinates are left unchanged
    #[default]
    None,
    /// Add N(0, (fraction * range)^2)
    Gaussian,
    /// Add U[-2 * fraction * range, 2 * fraction * range]
    Uniform,
}

impl fmt::Display for JitterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JitterMode::None => "none",
            JitterMode::Gaussian => "gaussian",
            JitterMode::Uniform => "uniform",
        };
        f.write_str(name)
    }
}

impl FromStr for JitterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "off" => Ok(JitterMode::None),
            "gaussian" | "normal" => Ok(JitterMode::Gaussian),
            "uniform" => Ok(JitterMode::Uniform),
            other => Err(format!("Unknown jitter mode: {}", other)),
        }
    }
}

/// Applies jitter using its own random source
pub struct Jitterer<R: Rng = StdRng> {
    mode: JitterMode,
    fraction: f64,
    rng: R,
}

impl Jitterer<StdRng> {
    /// Jitterer seeded from the operating system
    pub fn new(mode: JitterMode, fraction: f64) -> Self {
        Self::with_rng(mode, fraction, StdRng::from_entropy())
    }

    /// Reproducible jitterer
    pub fn seeded(mode: JitterMode, fraction: f64, seed: u64) -> Self {
        Self::with_rng(mode, fraction, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Jitterer<R> {
    pub fn with_rng(mode: JitterMode, fraction: f64, rng: R) -> Self {
        Self {
            mode,
            fraction,
            rng,
        }
    }

    pub fn mode(&self) -> JitterMode {
        self.mode
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Perturb one coordinate on an axis spanning `range`
    ///
    /// Missing values and zero-width ranges come back unchanged.
    pub fn jitter(&mut self, value: f64, range: &PlotRange) -> f64 {
        let scale = self.fraction * range.span();
        if is_missing(value) || !(scale > 0.0) {
            return value;
        }

        match self.mode {
            JitterMode::None => value,
            JitterMode::Gaussian => match Normal::new(0.0, scale) {
                Ok(noise) => value + self.rng.sample(noise),
                Err(_) => value,
            },
            JitterMode::Uniform => {
                let width = 2.0 * scale;
                value + self.rng.gen_range(-width..=width)
            }
        }
    }

    /// Perturb every coordinate of a sample
    pub fn jitter_all(&mut self, values: &[f64], range: &PlotRange) -> Vec<f64> {
        values.iter().map(|&v| self.jitter(v, range)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_range() -> PlotRange {
        PlotRange::new(0.0, 10.0)
    }

    #[test]
    fn test_none_is_identity() {
        let mut j = Jitterer::seeded(JitterMode::None, DEFAULT_JITTER_FRACTION, 7);
        for v in [-3.5, 0.0, 1.0, 1e9] {
            assert_eq!(j.jitter(v, &unit_range()), v);
        }
    }

    #[test]
    fn test_uniform_stays_in_band() {
        let mut j = Jitterer::seeded(JitterMode::Uniform, 0.03, 11);
        // 2 * 0.03 * 10
        let band = 0.6;
        for _ in 0..1000 {
            let v = j.jitter(5.0, &unit_range());
            assert!((v - 5.0).abs() <= band + 1e-12);
        }
    }

    #[test]
    fn test_gaussian_spread_matches_scale() {
        let mut j = Jitterer::seeded(JitterMode::Gaussian, 0.03, 13);
        let draws: Vec<f64> = (0..20000).map(|_| j.jitter(0.0, &unit_range())).collect();
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        let sd = (draws.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / draws.len() as f64)
            .sqrt();
        assert!(mean.abs() < 0.02);
        assert!((sd - 0.3).abs() < 0.02);
    }

    #[test]
    fn test_gaussian_reaches_tails() {
        let mut j = Jitterer::seeded(JitterMode::Gaussian, 0.1, 5);
        // sd is 1 on a 0..10 axis; 3 sd is exceeded about 27 times in 10k draws
        let far = (0..10000)
            .map(|_| j.jitter(0.0, &unit_range()))
            .filter(|d| d.abs() > 3.0)
            .count();
        assert!(far > 5 && far < 80, "{} draws beyond 3 sd", far);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = Jitterer::seeded(JitterMode::Gaussian, 0.03, 99);
        let mut b = Jitterer::seeded(JitterMode::Gaussian, 0.03, 99);
        let xs = [1.0, 2.0, 3.0];
        assert_eq!(a.jitter_all(&xs, &unit_range()), b.jitter_all(&xs, &unit_range()));
    }

    #[test]
    fn test_missing_and_degenerate_untouched() {
        let mut j = Jitterer::seeded(JitterMode::Uniform, 0.03, 1);
        assert!(j.jitter(f64::NAN, &unit_range()).is_nan());
        assert_eq!(j.jitter(4.0, &PlotRange::new(4.0, 4.0)), 4.0);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Gaussian".parse::<JitterMode>(), Ok(JitterMode::Gaussian));
        assert_eq!("off".parse::<JitterMode>(), Ok(JitterMode::None));
        assert!("wobble".parse::<JitterMode>().is_err());
        assert_eq!(JitterMode::Uniform.to_string(), "uniform");
    }
}
