//! Error types for tetplot-data

use thiserror::Error;

use crate::schema::VariableKind;

/// Errors raised while building or loading a dataset
#[derive(Debug, Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to open file: {0}")]
    OpenFailed(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("Dataset has no columns or no rows")]
    EmptyDataset,

    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Variable '{variable}' is not {expected}")]
    InvalidVariableKind {
        variable: String,
        expected: VariableKind,
    },
}

/// Result type for dataset operations
pub type IoResult<T> = Result<T, IoError>;
