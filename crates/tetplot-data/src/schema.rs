//! Variables and column storage

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category code marking a missing discrete value
pub const DISCRETE_MISSING: i32 = -99;

/// Whether a variable is measured on a numeric scale or by category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Continuous,
    Discrete,
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableKind::Continuous => f.write_str("continuous"),
            VariableKind::Discrete => f.write_str("discrete"),
        }
    }
}

/// A named column of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Column name
    pub name: String,

    /// Continuous or discrete
    pub kind: VariableKind,

    /// Category labels, indexed by code (empty for continuous variables)
    pub categories: Vec<String>,
}

impl Variable {
    /// Create a continuous variable
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Continuous,
            categories: Vec::new(),
        }
    }

    /// Create a discrete variable with the given category labels
    pub fn discrete<S: Into<String>>(
        name: impl Into<String>,
        categories: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Discrete,
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_continuous(&self) -> bool {
        self.kind == VariableKind::Continuous
    }

    pub fn is_discrete(&self) -> bool {
        self.kind == VariableKind::Discrete
    }

    /// Code for a category label
    pub fn category_code(&self, label: &str) -> Option<i32> {
        self.categories
            .iter()
            .position(|c| c == label)
            .map(|i| i as i32)
    }

    /// Label for a category code
    pub fn category_label(&self, code: i32) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.categories.get(i))
            .map(String::as_str)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Storage for one column
#[derive(Debug, Clone, PartialEq)]
pub enum DataColumn {
    Continuous(Vec<f64>),
    Discrete(Vec<i32>),
}

impl DataColumn {
    /// Kind of variable this storage can back
    pub fn kind(&self) -> VariableKind {
        match self {
            DataColumn::Continuous(_) => VariableKind::Continuous,
            DataColumn::Discrete(_) => VariableKind::Discrete,
        }
    }

    /// Get the number of elements
    pub fn len(&self) -> usize {
        match self {
            DataColumn::Continuous(v) => v.len(),
            DataColumn::Discrete(v) => v.len(),
        }
    }

    /// Check if the column is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the cell at `row` holds a missing sentinel
    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            DataColumn::Continuous(v) => !v[row].is_finite(),
            DataColumn::Discrete(v) => v[row] == DISCRETE_MISSING,
        }
    }

    /// Cell as f64; discrete codes are widened, missing becomes NaN
    pub fn get_f64(&self, row: usize) -> f64 {
        match self {
            DataColumn::Continuous(v) => v[row],
            DataColumn::Discrete(v) => {
                if v[row] == DISCRETE_MISSING {
                    f64::NAN
                } else {
                    v[row] as f64
                }
            }
        }
    }

    /// Category code, or `None` for continuous storage or a missing cell
    pub fn get_code(&self, row: usize) -> Option<i32> {
        match self {
            DataColumn::Discrete(v) if v[row] != DISCRETE_MISSING => Some(v[row]),
            _ => None,
        }
    }
}
