//! tetplot-stats - Numeric utilities behind scatter and Q-Q plots
//!
//! This crate holds the small, self-contained computations that plotting
//! panels call on every rebuild:
//!
//! - **Summary**: missing-aware sample statistics and plot ranges
//! - **Normal**: a normal distribution fitted to a sample
//! - **Quantile**: bisection search for fitted-normal quantiles and the
//!   Q-Q comparison table built from it
//! - **Jitter**: optional Gaussian or uniform perturbation against overplotting
//! - **Regression**: ordinary least-squares line for scatter overlays
//! - **Ntile**: breakpoints splitting a sample into equal-sized buckets
//!
//! NaN and ±infinity are treated as missing everywhere and never contribute
//! to a statistic.

pub mod error;
pub mod jitter;
pub mod normal;
pub mod ntile;
pub mod quantile;
pub mod regression;
pub mod summary;

pub use error::*;
pub use jitter::*;
pub use normal::*;
pub use ntile::*;
pub use quantile::*;
pub use regression::*;
pub use summary::*;
