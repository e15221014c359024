//! Normal Q-Q plot model
//!
//! Sorted sample values are paired with the quantiles of a normal fitted to
//! the same sample. Points near the `y = x` line indicate the sample is close
//! to normal.

use serde::{Deserialize, Serialize};
use tetplot_data::{TabularData, VariableKind};
use tetplot_stats::{FittedNormal, PlotRange, QuantileTable};
use tracing::debug;

use crate::axis::{PlotFrame, TickMark};
use crate::conditioning::{lookup, ConditioningSet};
use crate::config::QuantileSettings;
use crate::error::{PlotError, PlotResult};
use crate::scatter::LineSegment;

/// Geometry for a Q-Q panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QqLayout {
    /// Shared by both axes
    pub range: PlotRange,
    /// Pixel position of each (theoretical, observed) pair
    pub points: Vec<(f64, f64)>,
    /// The `y = x` line across the range
    pub reference: LineSegment,
    pub x_ticks: Vec<TickMark>,
    pub y_ticks: Vec<TickMark>,
}

/// One continuous variable against its fitted normal
#[derive(Debug, Clone)]
pub struct QqPlot {
    variable: String,
    conditioning: ConditioningSet,
    table: QuantileTable,
}

impl QqPlot {
    pub fn new(
        data: &dyn TabularData,
        variable: &str,
        conditioning: ConditioningSet,
        settings: &QuantileSettings,
    ) -> PlotResult<Self> {
        let var = lookup(data, variable)?;
        if var.kind != VariableKind::Continuous {
            return Err(PlotError::InvalidVariableKind {
                variable: variable.to_string(),
                expected: VariableKind::Continuous,
                actual: var.kind,
            });
        }
        let column = data
            .variable_index(variable)
            .ok_or_else(|| PlotError::VariableNotFound(variable.to_string()))?;

        let sample: Vec<f64> = conditioning
            .matching_rows(data)?
            .into_iter()
            .map(|row| data.double(row, column))
            .collect();

        let table = QuantileTable::build(&sample, &settings.search(), settings.search_width)?;
        debug!(
            variable,
            conditions = conditioning.len(),
            n = table.len(),
            unconverged = table.unconverged(),
            "rebuilt Q-Q plot"
        );

        Ok(Self {
            variable: variable.to_string(),
            conditioning,
            table,
        })
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn conditioning(&self) -> &ConditioningSet {
        &self.conditioning
    }

    pub fn table(&self) -> &QuantileTable {
        &self.table
    }

    pub fn distribution(&self) -> &FittedNormal {
        self.table.distribution()
    }

    /// (theoretical, observed) pairs in rank order
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.table.points()
    }

    /// Range covering both the observed and theoretical values
    pub fn range(&self) -> PlotResult<PlotRange> {
        let observed = PlotRange::from_sample(self.table.observed())?;
        let theoretical = PlotRange::from_sample(self.table.theoretical())?;
        Ok(observed.union(&theoretical))
    }

    /// Lay the plot out in a frame, both axes sharing one range
    pub fn render(&self, frame: &PlotFrame) -> PlotResult<QqLayout> {
        let range = self.range()?;
        let mapping = frame.mapping(range, range);

        let points = self
            .table
            .points()
            .into_iter()
            .map(|(t, o)| mapping.to_pixel(t, o))
            .collect();

        Ok(QqLayout {
            range,
            points,
            reference: LineSegment {
                start: mapping.to_pixel(range.min, range.min),
                end: mapping.to_pixel(range.max, range.max),
            },
            x_ticks: mapping.x.ticks(),
            y_ticks: mapping.y.ticks(),
        })
    }
}
