//! Scatter plot model
//!
//! Collects the (x, y) pairs of rows that pass the conditioning set and turns
//! them into pixel geometry, optionally with jitter and a least-squares
//! overlay line.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tetplot_data::{TabularData, VariableKind};
use tetplot_stats::{fit_line, is_missing, Jitterer, PlotRange, RegressionLine, StatsError};
use tracing::{debug, warn};

use crate::axis::{FrameMapping, PlotFrame, TickMark};
use crate::conditioning::{lookup, ConditioningSet};
use crate::error::{PlotError, PlotResult};

/// A straight segment in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

/// Everything a panel needs to draw a scatter plot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterLayout {
    pub x_range: PlotRange,
    pub y_range: PlotRange,
    /// Pixel coordinates of each point
    pub points: Vec<(f64, f64)>,
    /// Regression line clipped to the plot area, when requested and fittable
    pub overlay: Option<LineSegment>,
    /// The fitted line behind `overlay`
    pub regression: Option<RegressionLine>,
    /// Why the overlay was skipped, for display to the user
    pub overlay_message: Option<String>,
    pub x_ticks: Vec<TickMark>,
    pub y_ticks: Vec<TickMark>,
}

/// Conditioned (x, y) data for two continuous variables
#[derive(Debug, Clone)]
pub struct ScatterPlot {
    x_variable: String,
    y_variable: String,
    conditioning: ConditioningSet,
    include_line: bool,
    points: Vec<(f64, f64)>,
}

impl ScatterPlot {
    /// Build the plot, reading every row of `data` once
    ///
    /// The dataset needs at least two columns and one row, and both axis
    /// variables must be continuous.
    pub fn new(
        data: &dyn TabularData,
        x_variable: &str,
        y_variable: &str,
        conditioning: ConditioningSet,
        include_line: bool,
    ) -> PlotResult<Self> {
        if data.num_columns() < 2 {
            return Err(PlotError::NotEnoughColumns {
                required: 2,
                actual: data.num_columns(),
            });
        }
        if data.num_rows() == 0 {
            return Err(tetplot_data::IoError::EmptyDataset.into());
        }

        let x_index = continuous_index(data, x_variable)?;
        let y_index = continuous_index(data, y_variable)?;
        let bound = conditioning.bind(data)?;

        let points: Vec<(f64, f64)> = (0..data.num_rows())
            .filter(|&row| bound.passes(row))
            .map(|row| (data.double(row, x_index), data.double(row, y_index)))
            .filter(|(x, y)| !is_missing(*x) && !is_missing(*y))
            .collect();

        debug!(
            x = x_variable,
            y = y_variable,
            conditions = conditioning.len(),
            points = points.len(),
            "rebuilt scatter plot"
        );

        Ok(Self {
            x_variable: x_variable.to_string(),
            y_variable: y_variable.to_string(),
            conditioning,
            include_line,
            points,
        })
    }

    pub fn x_variable(&self) -> &str {
        &self.x_variable
    }

    pub fn y_variable(&self) -> &str {
        &self.y_variable
    }

    pub fn conditioning(&self) -> &ConditioningSet {
        &self.conditioning
    }

    pub fn include_line(&self) -> bool {
        self.include_line
    }

    /// Data-space points in row order
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn x_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.0).collect()
    }

    pub fn y_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.1).collect()
    }

    pub fn x_range(&self) -> PlotResult<PlotRange> {
        Ok(PlotRange::from_sample(&self.x_values())?)
    }

    pub fn y_range(&self) -> PlotResult<PlotRange> {
        Ok(PlotRange::from_sample(&self.y_values())?)
    }

    /// Least-squares line through the conditioned points
    pub fn regression(&self) -> PlotResult<RegressionLine> {
        Ok(fit_line(&self.x_values(), &self.y_values())?)
    }

    /// Lay the plot out in a frame
    ///
    /// A singular regression does not fail the render: the overlay is left
    /// out and `overlay_message` explains why.
    pub fn render<R: Rng>(
        &self,
        frame: &PlotFrame,
        jitterer: &mut Jitterer<R>,
    ) -> PlotResult<ScatterLayout> {
        let x_range = self.x_range()?;
        let y_range = self.y_range()?;
        let mapping = frame.mapping(x_range, y_range);

        let points = self
            .points
            .iter()
            .map(|&(x, y)| {
                let jx = jitterer.jitter(x, &x_range);
                let jy = jitterer.jitter(y, &y_range);
                mapping.to_pixel(jx, jy)
            })
            .collect();

        let (overlay, regression, overlay_message) = if self.include_line {
            match self.regression() {
                Ok(line) => (
                    overlay_segment(&mapping, &line, &x_range, &y_range),
                    Some(line),
                    None,
                ),
                Err(PlotError::Stats(err @ StatsError::SingularFit { .. })) => {
                    warn!(x = %self.x_variable, y = %self.y_variable, "skipping regression overlay: {}", err);
                    (None, None, Some(err.to_string()))
                }
                Err(err) => return Err(err),
            }
        } else {
            (None, None, None)
        };

        Ok(ScatterLayout {
            x_range,
            y_range,
            points,
            overlay,
            regression,
            overlay_message,
            x_ticks: mapping.x.ticks(),
            y_ticks: mapping.y.ticks(),
        })
    }
}

/// The part of `line` inside the x and y ranges, in pixels
fn overlay_segment(
    mapping: &FrameMapping,
    line: &RegressionLine,
    x_range: &PlotRange,
    y_range: &PlotRange,
) -> Option<LineSegment> {
    let (mut lo, mut hi) = (x_range.min, x_range.max);
    match (line.solve_x(y_range.min), line.solve_x(y_range.max)) {
        (Some(a), Some(b)) => {
            lo = lo.max(a.min(b));
            hi = hi.min(a.max(b));
        }
        _ => {
            if !y_range.contains(line.intercept) {
                return None;
            }
        }
    }
    if lo > hi {
        return None;
    }

    let clip = |x: f64| line.predict(x).clamp(y_range.min, y_range.max);
    Some(LineSegment {
        start: mapping.to_pixel(lo, clip(lo)),
        end: mapping.to_pixel(hi, clip(hi)),
    })
}

fn continuous_index(data: &dyn TabularData, variable: &str) -> PlotResult<usize> {
    let var = lookup(data, variable)?;
    if var.kind != VariableKind::Continuous {
        return Err(PlotError::InvalidVariableKind {
            variable: variable.to_string(),
            expected: VariableKind::Continuous,
            actual: var.kind,
        });
    }
    data.variable_index(variable)
        .ok_or_else(|| PlotError::VariableNotFound(variable.to_string()))
}
