//! Display settings for tetplot
//!
//! Settings persist as TOML under the user's config directory. Every field
//! has a default, so a partial file only overrides what it names.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tetplot_stats::{
    JitterMode, Jitterer, QuantileSearch, DEFAULT_JITTER_FRACTION, DEFAULT_QUANTILE_MAX_ITERATIONS,
    DEFAULT_QUANTILE_PRECISION, DEFAULT_SEARCH_WIDTH_SD,
};
use tracing::{debug, info};

use crate::axis::PlotFrame;
use crate::error::{PlotError, PlotResult};

/// All user-adjustable plot settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    /// Draw the least-squares line on scatter plots
    pub show_regression_line: bool,
    /// Point jitter
    pub jitter: JitterSettings,
    /// Q-Q quantile search
    pub quantile: QuantileSettings,
    /// Panel geometry
    pub frame: PlotFrame,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            show_regression_line: false,
            jitter: JitterSettings::default(),
            quantile: QuantileSettings::default(),
            frame: PlotFrame::default(),
        }
    }
}

/// Jitter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterSettings {
    pub mode: JitterMode,
    /// Scale as a fraction of the axis range
    pub fraction: f64,
    /// Fixed seed for reproducible output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for JitterSettings {
    fn default() -> Self {
        Self {
            mode: JitterMode::None,
            fraction: DEFAULT_JITTER_FRACTION,
            seed: None,
        }
    }
}

/// Quantile search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantileSettings {
    /// Stop once |CDF(x) - q| is below this
    pub precision: f64,
    /// Bisection step cap
    pub max_iterations: usize,
    /// Half-width of the search interval in standard deviations
    pub search_width: f64,
}

impl Default for QuantileSettings {
    fn default() -> Self {
        Self {
            precision: DEFAULT_QUANTILE_PRECISION,
            max_iterations: DEFAULT_QUANTILE_MAX_ITERATIONS,
            search_width: DEFAULT_SEARCH_WIDTH_SD,
        }
    }
}

impl QuantileSettings {
    pub fn search(&self) -> QuantileSearch {
        QuantileSearch::new(self.precision, self.max_iterations)
    }
}

impl PlotSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serialize settings to TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load settings from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize settings to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// `<config dir>/tetplot/settings.toml`, when the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tetplot").join("settings.toml"))
    }

    /// Read and validate a settings file
    pub fn load(path: &Path) -> PlotResult<Self> {
        let text = fs::read_to_string(path)?;
        let settings =
            Self::from_toml(&text).map_err(|e| PlotError::Config(format!("{}: {}", path.display(), e)))?;
        settings.validate()?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Load from the default path, falling back to defaults when no file exists
    pub fn load_or_default() -> PlotResult<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Write settings as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> PlotResult<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = self.to_toml().map_err(|e| PlotError::Config(e.to_string()))?;
        fs::write(path, text)?;
        info!(path = %path.display(), "saved settings");
        Ok(())
    }

    /// Validate settings values
    pub fn validate(&self) -> PlotResult<()> {
        let fraction = self.jitter.fraction;
        if !fraction.is_finite() || fraction < 0.0 {
            return Err(PlotError::Config(
                "jitter.fraction must be a non-negative number".to_string(),
            ));
        }

        let q = &self.quantile;
        if !(q.precision > 0.0 && q.precision < 1.0) {
            return Err(PlotError::Config(
                "quantile.precision must be between 0 and 1".to_string(),
            ));
        }
        if q.max_iterations == 0 {
            return Err(PlotError::Config(
                "quantile.max_iterations must be positive".to_string(),
            ));
        }
        if !q.search_width.is_finite() || q.search_width <= 0.0 {
            return Err(PlotError::Config(
                "quantile.search_width must be positive".to_string(),
            ));
        }

        if !self.frame.has_area() {
            return Err(PlotError::Config(
                "frame padding leaves no room to draw".to_string(),
            ));
        }

        Ok(())
    }

    /// A jitterer configured from these settings
    pub fn jitterer(&self) -> Jitterer {
        match self.jitter.seed {
            Some(seed) => Jitterer::seeded(self.jitter.mode, self.jitter.fraction, seed),
            None => Jitterer::new(self.jitter.mode, self.jitter.fraction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = PlotSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.jitter.mode, JitterMode::None);
        assert_eq!(settings.jitter.fraction, 0.03);
        assert!(!settings.show_regression_line);
        assert_eq!(settings.quantile.search(), QuantileSearch::default());
    }

    #[test]
    fn test_partial_toml() {
        let settings = PlotSettings::from_toml(
            r#"
show_regression_line = true

[jitter]
mode = "gaussian"
seed = 7
"#,
        )
        .unwrap();
        assert!(settings.show_regression_line);
        assert_eq!(settings.jitter.mode, JitterMode::Gaussian);
        assert_eq!(settings.jitter.seed, Some(7));
        assert_eq!(settings.jitter.fraction, DEFAULT_JITTER_FRACTION);
        assert_eq!(settings.frame, PlotFrame::default());
    }

    #[test]
    fn test_json_serialization() {
        let mut settings = PlotSettings::default();
        settings.jitter.mode = JitterMode::Uniform;
        let json = settings.to_json().unwrap();
        assert!(!json.contains("seed"));
        let parsed = PlotSettings::from_json(&json).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_invalid_values() {
        let mut settings = PlotSettings::default();
        settings.jitter.fraction = -0.1;
        assert!(matches!(settings.validate(), Err(PlotError::Config(_))));

        let mut settings = PlotSettings::default();
        settings.quantile.max_iterations = 0;
        assert!(settings.validate().is_err());

        let mut settings = PlotSettings::default();
        settings.quantile.precision = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = PlotSettings::default();
        settings.frame = PlotFrame::new(80.0, 80.0, 50.0);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let mut settings = PlotSettings::default();
        settings.show_regression_line = true;
        settings.quantile.max_iterations = 40;
        settings.save(&path).unwrap();

        let loaded = PlotSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_rejects_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[quantile]\nmax_iterations = \"many\"\n").unwrap();
        assert!(matches!(PlotSettings::load(&path), Err(PlotError::Config(_))));

        let missing = dir.path().join("absent.toml");
        assert!(matches!(PlotSettings::load(&missing), Err(PlotError::Io(_))));
    }

    #[test]
    fn test_seeded_jitterer_is_reproducible() {
        let mut settings = PlotSettings::default();
        settings.jitter.mode = JitterMode::Gaussian;
        settings.jitter.seed = Some(42);
        let range = tetplot_stats::PlotRange::new(0.0, 10.0);

        let a = settings.jitterer().jitter_all(&[1.0, 2.0, 3.0], &range);
        let b = settings.jitterer().jitter_all(&[1.0, 2.0, 3.0], &range);
        assert_eq!(a, b);
        assert_ne!(a, vec![1.0, 2.0, 3.0]);
    }
}
