//! Delimited-text loading with variable-kind inference
//!
//! A column whose non-missing cells all parse as numbers becomes a
//! continuous variable. Any other column becomes a discrete variable whose
//! categories are its distinct labels in order of first appearance.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::dataset::DataSet;
use crate::error::{IoError, IoResult};
use crate::schema::{DataColumn, Variable, DISCRETE_MISSING};

/// Tokens read as a missing value
const MISSING_TOKENS: [&str; 4] = ["*", "?", "na", "nan"];

/// Loader settings
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field separator
    pub delimiter: u8,
    /// Columns loaded as discrete even when every cell is numeric
    pub discrete: Vec<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            discrete: Vec::new(),
        }
    }
}

impl CsvOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_discrete(mut self, name: impl Into<String>) -> Self {
        self.discrete.push(name.into());
        self
    }
}

/// Reads a headed, delimited table into a `DataSet`
pub struct CsvReader;

impl CsvReader {
    /// Open a comma-separated file (tab-separated for `.tsv`)
    pub fn open(path: &str) -> IoResult<DataSet> {
        let options = if path.to_lowercase().ends_with(".tsv") {
            CsvOptions::default().with_delimiter(b'\t')
        } else {
            CsvOptions::default()
        };
        Self::open_with_options(path, &options)
    }

    /// Open a file with options
    pub fn open_with_options(path: &str, options: &CsvOptions) -> IoResult<DataSet> {
        if !Path::new(path).exists() {
            return Err(IoError::FileNotFound(path.to_string()));
        }

        let file = File::open(path).map_err(|e| IoError::OpenFailed(e.to_string()))?;
        debug!(path, "loading delimited data");
        Self::from_reader(BufReader::new(file), options)
    }

    /// Parse a table from any reader
    pub fn from_reader<R: Read>(reader: R, options: &CsvOptions) -> IoResult<DataSet> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| IoError::InvalidFormat(e.to_string()))?
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for (line, result) in reader.records().enumerate() {
            let record = result.map_err(|e| IoError::InvalidFormat(e.to_string()))?;
            if record.len() != headers.len() {
                return Err(IoError::InvalidFormat(format!(
                    "record {} has {} fields, header has {}",
                    line + 1,
                    record.len(),
                    headers.len()
                )));
            }
            for (i, value) in record.iter().enumerate() {
                cells[i].push(value.to_string());
            }
        }

        for name in &options.discrete {
            if !headers.contains(name) {
                return Err(IoError::ColumnNotFound(name.clone()));
            }
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, values)| {
                let force_discrete = options.discrete.contains(&name);
                if !force_discrete && is_numeric(&values) {
                    (
                        Variable::continuous(name),
                        DataColumn::Continuous(parse_continuous(&values)),
                    )
                } else {
                    let (categories, codes) = parse_discrete(&values);
                    (
                        Variable::discrete(name, categories),
                        DataColumn::Discrete(codes),
                    )
                }
            })
            .collect();

        DataSet::new(columns)
    }
}

/// Whether a cell holds a missing token
fn is_missing_token(value: &str) -> bool {
    value.is_empty() || MISSING_TOKENS.contains(&value.to_lowercase().as_str())
}

/// Whether every non-missing cell parses as a number
fn is_numeric(values: &[String]) -> bool {
    values
        .iter()
        .filter(|s| !is_missing_token(s))
        .all(|s| s.parse::<f64>().is_ok())
}

fn parse_continuous(values: &[String]) -> Vec<f64> {
    values
        .iter()
        .map(|s| {
            if is_missing_token(s) {
                f64::NAN
            } else {
                s.parse().unwrap_or(f64::NAN)
            }
        })
        .collect()
}

/// Category labels in first-seen order and the code of each cell
fn parse_discrete(values: &[String]) -> (Vec<String>, Vec<i32>) {
    let mut categories: Vec<String> = Vec::new();
    let codes = values
        .iter()
        .map(|s| {
            if is_missing_token(s) {
                return DISCRETE_MISSING;
            }
            match categories.iter().position(|c| c == s) {
                Some(i) => i as i32,
                None => {
                    categories.push(s.clone());
                    (categories.len() - 1) as i32
                }
            }
        })
        .collect();
    (categories, codes)
}
