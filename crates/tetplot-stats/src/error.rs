//! Error types for tetplot-stats

use thiserror::Error;

/// Errors raised by the numeric utilities
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// The least-squares system has no unique solution
    #[error("Regression line cannot be fit: {reason}")]
    SingularFit { reason: String },

    /// Every value in the sample was missing
    #[error("Sample contains no non-missing values")]
    EmptySample,

    /// Parallel arrays of different lengths
    #[error("Length mismatch: x has {x} values, y has {y}")]
    LengthMismatch { x: usize, y: usize },

    /// Cumulative probability outside the open unit interval
    #[error("Probability must lie strictly between 0 and 1, got {0}")]
    InvalidProbability(f64),

    /// Distribution parameters that do not describe a distribution
    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),

    /// N-tile count outside 2..=10
    #[error("N-tile should be in range 2 to 10: {0}")]
    NtileOutOfRange(usize),

    /// Bucket index outside 1..=ntile
    #[error("N-tile index {index} out of range for {ntile} buckets")]
    NtileIndexOutOfRange { ntile: usize, index: usize },
}

impl StatsError {
    pub(crate) fn singular(reason: impl Into<String>) -> Self {
        StatsError::SingularFit {
            reason: reason.into(),
        }
    }
}

/// Result type alias for numeric operations
pub type StatsResult<T> = Result<T, StatsError>;
