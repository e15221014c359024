//! tetplot-core - Plot models for scatter and Q-Q displays
//!
//! This crate turns a tabular dataset into the geometry a plotting panel
//! draws. It holds no toolkit code; a front end asks a model to render
//! into a `PlotFrame` and draws the returned pixel coordinates.
//!
//! # Key Components
//!
//! - **Axis**: data-to-pixel mapping, plot frames, and tick marks
//! - **Conditioning**: row filters on continuous intervals or discrete categories
//! - **ScatterPlot**: conditioned (x, y) points with jitter and a regression overlay
//! - **QqPlot**: a sample against fitted-normal quantiles
//! - **PlotSettings**: display options loaded from and saved to TOML
//! - **EventRegistry**: named callbacks fired when a controller rebuilds a plot
//!
//! Every model is rebuilt from scratch when its inputs change.

pub mod axis;
pub mod conditioning;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod qq;
pub mod scatter;

pub use axis::*;
pub use conditioning::*;
pub use config::*;
pub use controller::*;
pub use error::*;
pub use events::*;
pub use qq::*;
pub use scatter::*;
