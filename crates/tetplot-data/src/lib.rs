//! tetplot-data - Tabular datasets for plotting
//!
//! Plots read their samples from a rectangular dataset of named variables:
//!
//! - **Continuous** variables hold `f64` values; NaN and ±infinity are missing
//! - **Discrete** variables hold integer category codes; `-99` is missing
//!
//! # Design
//!
//! Plot code talks to the `TabularData` trait so any table can back a plot.
//! `DataSet` is the in-memory implementation, and `CsvReader` fills one from
//! delimited text.

pub mod dataset;
pub mod error;
pub mod schema;

#[cfg(feature = "csv")]
pub mod csv_reader;

pub use dataset::*;
pub use error::*;
pub use schema::*;

#[cfg(feature = "csv")]
pub use csv_reader::{CsvOptions, CsvReader};
