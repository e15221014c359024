//! Error types for tetplot-core
//!
//! Provides error handling for:
//! - Numeric failures (singular fits, empty samples)
//! - Dataset lookups and variable kinds
//! - Conditioning and settings validation

use tetplot_data::{IoError, VariableKind};
use tetplot_stats::StatsError;
use thiserror::Error;

/// Main error type for plot operations
#[derive(Error, Debug)]
pub enum PlotError {
    /// Numeric errors from the stats layer
    #[error(transparent)]
    Stats(#[from] StatsError),

    /// Dataset errors
    #[error(transparent)]
    Data(#[from] IoError),

    /// A continuous variable was required and a discrete one given, or the reverse
    #[error("Variable '{variable}' is {actual}; expected {expected}")]
    InvalidVariableKind {
        variable: String,
        expected: VariableKind,
        actual: VariableKind,
    },

    /// Unknown variable name
    #[error("Variable not found: {0}")]
    VariableNotFound(String),

    /// Second condition for the same variable
    #[error("There is already a conditioning variable called {0}")]
    DuplicateCondition(String),

    /// Condition parameters that select nothing sensible
    #[error("Invalid condition on '{variable}': {message}")]
    InvalidCondition { variable: String, message: String },

    /// Dataset too narrow for the plot
    #[error("Need at least {required} columns, dataset has {actual}")]
    NotEnoughColumns { required: usize, actual: usize },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlotError {
    /// Whether this is a singular regression fit
    pub fn is_singular_fit(&self) -> bool {
        matches!(self, PlotError::Stats(StatsError::SingularFit { .. }))
    }
}

/// Result type alias for plot operations
pub type PlotResult<T> = Result<T, PlotError>;
