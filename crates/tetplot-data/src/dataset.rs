//! The tabular dataset abstraction and its in-memory implementation

use std::collections::HashSet;

use tracing::debug;

use crate::error::{IoError, IoResult};
use crate::schema::{DataColumn, Variable, VariableKind, DISCRETE_MISSING};

/// Read access to a rectangular table of variables
///
/// Cell accessors take `(row, column)` indices and panic when either is out
/// of range, like slice indexing.
pub trait TabularData {
    /// Number of rows
    fn num_rows(&self) -> usize;

    /// Number of columns
    fn num_columns(&self) -> usize;

    /// Variable at a column index
    fn variable(&self, column: usize) -> Option<&Variable>;

    /// Column index of a variable name
    fn variable_index(&self, name: &str) -> Option<usize>;

    /// Cell as f64 (NaN when missing, category code for discrete columns)
    fn double(&self, row: usize, column: usize) -> f64;

    /// Category code of a discrete cell, `None` when missing or continuous
    fn code(&self, row: usize, column: usize) -> Option<i32>;

    /// Whether a cell holds a missing sentinel
    fn is_missing(&self, row: usize, column: usize) -> bool;

    /// Variable by name
    fn variable_named(&self, name: &str) -> Option<&Variable> {
        self.variable_index(name).and_then(|i| self.variable(i))
    }

    /// All variables in column order
    fn variables(&self) -> Vec<&Variable> {
        (0..self.num_columns())
            .filter_map(|i| self.variable(i))
            .collect()
    }

    /// Whole column of a continuous variable, missing cells included
    fn continuous_column(&self, name: &str) -> IoResult<Vec<f64>> {
        let index = self
            .variable_index(name)
            .ok_or_else(|| IoError::ColumnNotFound(name.to_string()))?;
        let kind = self.variable(index).map(|v| v.kind);
        if kind != Some(VariableKind::Continuous) {
            return Err(IoError::InvalidVariableKind {
                variable: name.to_string(),
                expected: VariableKind::Continuous,
            });
        }
        Ok((0..self.num_rows()).map(|r| self.double(r, index)).collect())
    }
}

/// In-memory dataset
#[derive(Debug, Clone)]
pub struct DataSet {
    variables: Vec<Variable>,
    columns: Vec<DataColumn>,
    num_rows: usize,
}

impl DataSet {
    /// Build a dataset from (variable, storage) pairs
    ///
    /// Rejects an empty table, columns of different lengths, repeated
    /// names, storage that does not match the variable kind, and discrete
    /// codes outside the variable's categories.
    pub fn new(columns: Vec<(Variable, DataColumn)>) -> IoResult<Self> {
        let num_rows = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        if columns.is_empty() || num_rows == 0 {
            return Err(IoError::EmptyDataset);
        }

        let mut seen = HashSet::new();
        for (variable, column) in &columns {
            if !seen.insert(variable.name.as_str()) {
                return Err(IoError::DuplicateColumn(variable.name.clone()));
            }
            if column.len() != num_rows {
                return Err(IoError::RaggedColumns {
                    column: variable.name.clone(),
                    expected: num_rows,
                    actual: column.len(),
                });
            }
            if column.kind() != variable.kind {
                return Err(IoError::InvalidVariableKind {
                    variable: variable.name.clone(),
                    expected: variable.kind,
                });
            }
            if let DataColumn::Discrete(codes) = column {
                let limit = variable.categories.len() as i32;
                if let Some(bad) = codes
                    .iter()
                    .find(|&&c| c != DISCRETE_MISSING && !(0..limit).contains(&c))
                {
                    return Err(IoError::InvalidFormat(format!(
                        "code {} out of range for '{}' with {} categories",
                        bad, variable.name, limit
                    )));
                }
            }
        }

        let (variables, columns): (Vec<_>, Vec<_>) = columns.into_iter().unzip();
        debug!(rows = num_rows, columns = variables.len(), "built dataset");
        Ok(Self {
            variables,
            columns,
            num_rows,
        })
    }

    /// Start a dataset one column at a time
    pub fn builder() -> DataSetBuilder {
        DataSetBuilder::default()
    }

    /// Storage for a column
    pub fn column(&self, index: usize) -> Option<&DataColumn> {
        self.columns.get(index)
    }
}

impl TabularData for DataSet {
    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn num_columns(&self) -> usize {
        self.variables.len()
    }

    fn variable(&self, column: usize) -> Option<&Variable> {
        self.variables.get(column)
    }

    fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name)
    }

    fn double(&self, row: usize, column: usize) -> f64 {
        self.columns[column].get_f64(row)
    }

    fn code(&self, row: usize, column: usize) -> Option<i32> {
        self.columns[column].get_code(row)
    }

    fn is_missing(&self, row: usize, column: usize) -> bool {
        self.columns[column].is_missing(row)
    }
}

/// Collects columns for `DataSet::new`
#[derive(Debug, Default)]
pub struct DataSetBuilder {
    columns: Vec<(Variable, DataColumn)>,
}

impl DataSetBuilder {
    /// Add a continuous column
    pub fn continuous(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.columns
            .push((Variable::continuous(name), DataColumn::Continuous(values)));
        self
    }

    /// Add a discrete column of category codes
    pub fn discrete<S: Into<String>>(
        mut self,
        name: impl Into<String>,
        categories: impl IntoIterator<Item = S>,
        codes: Vec<i32>,
    ) -> Self {
        self.columns.push((
            Variable::discrete(name, categories),
            DataColumn::Discrete(codes),
        ));
        self
    }

    pub fn build(self) -> IoResult<DataSet> {
        DataSet::new(self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataSet {
        DataSet::builder()
            .continuous("x", vec![1.0, 2.0, 3.0, f64::NAN, 5.0])
            .continuous("y", vec![2.0, 4.0, 6.0, 8.0, 10.0])
            .discrete("g", ["a", "b"], vec![0, 1, 0, 1, DISCRETE_MISSING])
            .build()
            .unwrap()
    }

    #[test]
    fn test_lookup() {
        let data = sample();
        assert_eq!(data.num_rows(), 5);
        assert_eq!(data.num_columns(), 3);
        assert_eq!(data.variable_index("y"), Some(1));
        assert_eq!(data.variable_named("g").map(|v| v.kind), Some(VariableKind::Discrete));
        assert!(data.variable_named("z").is_none());
        assert_eq!(data.variables().len(), 3);
    }

    #[test]
    fn test_cells() {
        let data = sample();
        assert_eq!(data.double(1, 0), 2.0);
        assert!(data.is_missing(3, 0));
        assert_eq!(data.code(1, 2), Some(1));
        assert_eq!(data.code(4, 2), None);
        assert!(data.is_missing(4, 2));
        assert_eq!(data.code(0, 0), None);
    }

    #[test]
    fn test_continuous_column() {
        let data = sample();
        let x = data.continuous_column("x").unwrap();
        assert_eq!(x.len(), 5);
        assert!(x[3].is_nan());
        assert!(matches!(
            data.continuous_column("g"),
            Err(IoError::InvalidVariableKind { .. })
        ));
        assert!(matches!(
            data.continuous_column("nope"),
            Err(IoError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(DataSet::new(vec![]), Err(IoError::EmptyDataset)));
        assert!(matches!(
            DataSet::builder().continuous("x", vec![]).build(),
            Err(IoError::EmptyDataset)
        ));
    }

    #[test]
    fn test_rejects_ragged_and_duplicates() {
        let ragged = DataSet::builder()
            .continuous("x", vec![1.0, 2.0])
            .continuous("y", vec![1.0])
            .build();
        assert!(matches!(ragged, Err(IoError::RaggedColumns { .. })));

        let dup = DataSet::builder()
            .continuous("x", vec![1.0])
            .continuous("x", vec![2.0])
            .build();
        assert!(matches!(dup, Err(IoError::DuplicateColumn(_))));
    }

    #[test]
    fn test_rejects_bad_codes_and_kind_mismatch() {
        let bad = DataSet::builder().discrete("g", ["a"], vec![0, 3]).build();
        assert!(matches!(bad, Err(IoError::InvalidFormat(_))));

        let mismatch = DataSet::new(vec![(
            Variable::continuous("x"),
            DataColumn::Discrete(vec![0]),
        )]);
        let err = mismatch.unwrap_err();
        assert!(matches!(
            &err,
            IoError::InvalidVariableKind { variable, expected: VariableKind::Continuous } if variable == "x"
        ));
        assert_eq!(err.to_string(), "Variable 'x' is not continuous");
    }
}
