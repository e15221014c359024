//! Data-to-pixel mapping for 2D plots
//!
//! Horizontal axes grow left to right. Vertical axes are flipped: data grows
//! upward while pixel rows grow downward. An axis whose data range has zero
//! width maps every value to the middle of its pixel range.

use serde::{Deserialize, Serialize};
use tetplot_stats::PlotRange;

/// Map a value linearly from `[axis_min, axis_max]` onto `[pixel_min, pixel_max]`
pub fn map_coordinate(
    value: f64,
    axis_min: f64,
    axis_max: f64,
    pixel_min: f64,
    pixel_max: f64,
) -> f64 {
    if axis_max == axis_min {
        return pixel_min + (pixel_max - pixel_min) / 2.0;
    }
    pixel_min + (value - axis_min) / (axis_max - axis_min) * (pixel_max - pixel_min)
}

/// Like `map_coordinate`, with `axis_min` landing on `pixel_max`
pub fn map_coordinate_flipped(
    value: f64,
    axis_min: f64,
    axis_max: f64,
    pixel_min: f64,
    pixel_max: f64,
) -> f64 {
    if axis_max == axis_min {
        return pixel_min + (pixel_max - pixel_min) / 2.0;
    }
    pixel_max - (value - axis_min) / (axis_max - axis_min) * (pixel_max - pixel_min)
}

/// Axis direction on screen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisOrientation {
    Horizontal,
    Vertical,
}

/// One axis of a plot: a data interval bound to a pixel interval
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisMapping {
    pub axis_min: f64,
    pub axis_max: f64,
    pub pixel_min: f64,
    pub pixel_max: f64,
    pub orientation: AxisOrientation,
}

impl AxisMapping {
    pub fn horizontal(range: PlotRange, pixel_min: f64, pixel_max: f64) -> Self {
        Self {
            axis_min: range.min,
            axis_max: range.max,
            pixel_min,
            pixel_max,
            orientation: AxisOrientation::Horizontal,
        }
    }

    pub fn vertical(range: PlotRange, pixel_min: f64, pixel_max: f64) -> Self {
        Self {
            axis_min: range.min,
            axis_max: range.max,
            pixel_min,
            pixel_max,
            orientation: AxisOrientation::Vertical,
        }
    }

    /// Whether the data interval has zero width
    pub fn is_degenerate(&self) -> bool {
        self.axis_max == self.axis_min
    }

    /// Data value to pixel coordinate
    pub fn map(&self, value: f64) -> f64 {
        match self.orientation {
            AxisOrientation::Horizontal => map_coordinate(
                value,
                self.axis_min,
                self.axis_max,
                self.pixel_min,
                self.pixel_max,
            ),
            AxisOrientation::Vertical => map_coordinate_flipped(
                value,
                self.axis_min,
                self.axis_max,
                self.pixel_min,
                self.pixel_max,
            ),
        }
    }

    /// Pixel coordinate back to a data value
    ///
    /// A degenerate axis returns its single data value.
    pub fn unmap(&self, pixel: f64) -> f64 {
        let span = self.pixel_max - self.pixel_min;
        if self.is_degenerate() || span == 0.0 {
            return self.axis_min;
        }
        let t = match self.orientation {
            AxisOrientation::Horizontal => (pixel - self.pixel_min) / span,
            AxisOrientation::Vertical => (self.pixel_max - pixel) / span,
        };
        self.axis_min + t * (self.axis_max - self.axis_min)
    }

    /// Tick marks for this axis, with pixel positions filled in
    pub fn ticks(&self) -> Vec<TickMark> {
        calculate_ticks(self.axis_min, self.axis_max)
            .into_iter()
            .map(|mut tick| {
                tick.pixel = self.map(tick.value);
                tick
            })
            .collect()
    }
}

/// Panel size and the padding kept clear around the plot area
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlotFrame {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Default for PlotFrame {
    fn default() -> Self {
        Self {
            width: 750.0,
            height: 450.0,
            padding: 50.0,
        }
    }
}

impl PlotFrame {
    pub fn new(width: f64, height: f64, padding: f64) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }

    /// Whether padding leaves a drawable area of positive size
    pub fn has_area(&self) -> bool {
        self.padding >= 0.0
            && self.width - 2.0 * self.padding > 0.0
            && self.height - 2.0 * self.padding > 0.0
    }

    /// Bind x and y data ranges to the padded plot area
    pub fn mapping(&self, x_range: PlotRange, y_range: PlotRange) -> FrameMapping {
        FrameMapping {
            x: AxisMapping::horizontal(x_range, self.padding, self.width - self.padding),
            y: AxisMapping::vertical(y_range, self.padding, self.height - self.padding),
        }
    }
}

/// Both axes of a frame
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameMapping {
    pub x: AxisMapping,
    pub y: AxisMapping,
}

impl FrameMapping {
    /// Transform data coordinates to pixel coordinates
    pub fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (self.x.map(x), self.y.map(y))
    }

    /// Transform pixel coordinates to data coordinates
    pub fn to_data(&self, px: f64, py: f64) -> (f64, f64) {
        (self.x.unmap(px), self.y.unmap(py))
    }
}

/// A labelled position on an axis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickMark {
    /// Position in data coordinates
    pub value: f64,

    /// Position in pixels (0 until bound to an axis)
    pub pixel: f64,

    /// Label text
    pub label: String,
}

/// "Nice" tick values covering `[min, max]`
pub fn calculate_ticks(min: f64, max: f64) -> Vec<TickMark> {
    let range = max - min;
    if !(range > 0.0) || !range.is_finite() {
        return if min.is_finite() {
            vec![TickMark {
                value: min,
                pixel: 0.0,
                label: format_number(min),
            }]
        } else {
            vec![]
        };
    }

    // Calculate nice tick spacing
    let rough_step = range / 5.0;
    let magnitude = 10.0_f64.powf(rough_step.log10().floor());
    let residual = rough_step / magnitude;

    let nice_step = if residual <= 1.5 {
        1.0 * magnitude
    } else if residual <= 3.0 {
        2.0 * magnitude
    } else if residual <= 7.0 {
        5.0 * magnitude
    } else {
        10.0 * magnitude
    };

    let start = (min / nice_step).ceil() * nice_step;
    let mut ticks = Vec::new();

    let mut i = 0.0;
    loop {
        let value = start + i * nice_step;
        if value > max + nice_step * 0.001 {
            break;
        }
        // Avoid printing -0
        let value = if value.abs() < nice_step * 1e-9 { 0.0 } else { value };
        ticks.push(TickMark {
            value,
            pixel: 0.0,
            label: format_number(value),
        });
        i += 1.0;
    }

    ticks
}

/// Format a tick value for display
fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value.abs() >= 10000.0 || value.abs() < 0.01 {
        format!("{:.2e}", value)
    } else if value.fract().abs() < 1e-10 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}
