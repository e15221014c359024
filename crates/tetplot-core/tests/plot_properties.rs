//! Plot model integration tests
//!
//! Property-based checks for the quantile search, coordinate mapping and
//! jitter, plus end-to-end runs from CSV text to rendered layouts.

use std::io::Write;

use proptest::prelude::*;
use tetplot_core::{
    map_coordinate, map_coordinate_flipped, ConditioningSet, ContinuousRule, PlotError, PlotFrame,
    PlotSettings, QqPlot, QuantileSettings, ScatterController, ScatterPlot,
};
use tetplot_data::{CsvOptions, CsvReader, TabularData};
use tetplot_stats::{
    fit_line, FittedNormal, JitterMode, Jitterer, PlotRange, QuantileSearch, StatsError,
};

// === Regression ===

#[test]
fn test_collinear_fit() {
    let line = fit_line(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
    assert!(line.intercept.abs() < 1e-10, "intercept {}", line.intercept);
    assert!((line.slope - 2.0).abs() < 1e-10, "slope {}", line.slope);
}

#[test]
fn test_zero_variance_fit_is_singular() {
    let result = fit_line(&[1.0, 1.0], &[1.0, 2.0]);
    assert!(matches!(result, Err(StatsError::SingularFit { .. })));
}

// === Ranges ===

#[test]
fn test_range_ignores_nan() {
    let range = PlotRange::from_sample(&[1.0, 2.0, 3.0, f64::NAN, 5.0]).unwrap();
    assert_eq!(range.min, 1.0);
    assert_eq!(range.max, 5.0);
}

#[test]
fn test_range_from_csv_column() {
    let text = "a,b\n1.0,x\n2.0,y\n3.0,x\nNaN,y\n5.0,x\n";
    let data = CsvReader::from_reader(text.as_bytes(), &CsvOptions::default()).unwrap();
    let column = data.continuous_column("a").unwrap();
    let range = PlotRange::from_sample(&column).unwrap();
    assert_eq!((range.min, range.max), (1.0, 5.0));
}

// === Coordinate mapping ===

#[test]
fn test_degenerate_axis_gives_midpoint() {
    let pixel = map_coordinate(7.0, 3.0, 3.0, 10.0, 110.0);
    assert!(pixel.is_finite());
    assert_eq!(pixel, 60.0);
    assert_eq!(map_coordinate_flipped(7.0, 3.0, 3.0, 10.0, 110.0), 60.0);
}

// === End to end ===

fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const HEIGHTS: &str = "\
height,weight,sex
150,50,f
160,56,f
170,64,m
*,70,m
180,72,m
165,60,f
";

#[test]
fn test_scatter_from_csv_file() {
    let file = write_csv(HEIGHTS);
    let data = CsvReader::open(file.path().to_str().unwrap()).unwrap();
    assert_eq!(data.num_rows(), 6);

    let mut conditioning = ConditioningSet::new();
    conditioning.add_category_label(&data, "sex", "f").unwrap();
    let plot = ScatterPlot::new(&data, "height", "weight", conditioning, true).unwrap();
    assert_eq!(plot.points().len(), 3);

    let mut jitterer = Jitterer::seeded(JitterMode::None, 0.03, 1);
    let layout = plot.render(&PlotFrame::default(), &mut jitterer).unwrap();
    assert!(layout.overlay.is_some());
    let line = layout.regression.unwrap();
    assert!(line.slope > 0.0);
    assert_eq!(line.n, 3);
}

#[test]
fn test_qq_from_csv_file() {
    let file = write_csv(HEIGHTS);
    let data = CsvReader::open(file.path().to_str().unwrap()).unwrap();

    let qq = QqPlot::new(&data, "height", ConditioningSet::new(), &QuantileSettings::default())
        .unwrap();
    assert_eq!(qq.table().len(), 5);
    assert_eq!(qq.table().unconverged(), 0);

    let result = QqPlot::new(&data, "sex", ConditioningSet::new(), &QuantileSettings::default());
    assert!(matches!(result, Err(PlotError::InvalidVariableKind { .. })));
}

#[test]
fn test_controller_from_csv_file() {
    let file = write_csv(HEIGHTS);
    let data = CsvReader::open(file.path().to_str().unwrap()).unwrap();

    let mut settings = PlotSettings::default();
    settings.show_regression_line = true;
    settings.jitter.mode = JitterMode::Uniform;
    settings.jitter.seed = Some(3);

    let mut controller = ScatterController::new(&data, settings).unwrap();
    controller
        .add_continuous_condition("height", ContinuousRule::AboveAverage)
        .unwrap();
    let first = controller.layout().unwrap();
    let second = controller.layout().unwrap();
    // Seeded jitter renders identically each time.
    assert_eq!(first.points, second.points);
    assert!(first.points.len() < 5);
}

// === Properties ===

proptest! {
    #[test]
    fn test_quantile_within_precision(
        mean in -1000.0f64..1000.0,
        sd in 0.01f64..100.0,
        q in 0.001f64..0.999,
    ) {
        let dist = FittedNormal::new(mean, sd).unwrap();
        let search = QuantileSearch::default();
        let estimate = search.find(q, &dist, mean - 8.0 * sd, mean + 8.0 * sd).unwrap();
        prop_assert!(
            (dist.cdf(estimate.value) - q).abs() < search.precision
                || estimate.iterations == search.max_iterations,
            "q = {}, x = {}, iterations = {}",
            q,
            estimate.value,
            estimate.iterations
        );
    }

    #[test]
    fn test_quantile_monotone(
        mean in -100.0f64..100.0,
        sd in 0.1f64..10.0,
        q1 in 0.01f64..0.99,
        q2 in 0.01f64..0.99,
    ) {
        let (q1, q2) = if q1 <= q2 { (q1, q2) } else { (q2, q1) };
        let dist = FittedNormal::new(mean, sd).unwrap();
        let search = QuantileSearch::default();
        let (low, high) = (mean - 8.0 * sd, mean + 8.0 * sd);
        let x1 = search.find(q1, &dist, low, high).unwrap().value;
        let x2 = search.find(q2, &dist, low, high).unwrap().value;
        // A CDF error below 1e-6 moves x by at most ~4e-5 sd in this q range.
        prop_assert!(x1 <= x2 + 1e-4 * sd, "x1 = {}, x2 = {}", x1, x2);
    }

    #[test]
    fn test_mapping_endpoints_and_affine(
        axis_min in -1e4f64..1e4,
        width in 0.1f64..1e4,
        pixel_min in 0.0f64..500.0,
        pixel_span in 1.0f64..2000.0,
        t in 0.0f64..1.0,
    ) {
        let axis_max = axis_min + width;
        let pixel_max = pixel_min + pixel_span;
        let tol = 1e-6 * pixel_span;

        let at_min = map_coordinate(axis_min, axis_min, axis_max, pixel_min, pixel_max);
        let at_max = map_coordinate(axis_max, axis_min, axis_max, pixel_min, pixel_max);
        prop_assert!((at_min - pixel_min).abs() < tol);
        prop_assert!((at_max - pixel_max).abs() < tol);

        let flipped_min = map_coordinate_flipped(axis_min, axis_min, axis_max, pixel_min, pixel_max);
        let flipped_max = map_coordinate_flipped(axis_max, axis_min, axis_max, pixel_min, pixel_max);
        prop_assert!((flipped_min - pixel_max).abs() < tol);
        prop_assert!((flipped_max - pixel_min).abs() < tol);

        // Equal steps in data give equal steps in pixels.
        let value = axis_min + t * width;
        let step = width / 4.0;
        let p0 = map_coordinate(value, axis_min, axis_max, pixel_min, pixel_max);
        let p1 = map_coordinate(value + step, axis_min, axis_max, pixel_min, pixel_max);
        let p2 = map_coordinate(value + 2.0 * step, axis_min, axis_max, pixel_min, pixel_max);
        prop_assert!(((p1 - p0) - (p2 - p1)).abs() < tol);
        prop_assert!(((p1 - p0) - pixel_span / 4.0).abs() < tol);
    }

    #[test]
    fn test_degenerate_mapping_is_finite(
        value in -1e6f64..1e6,
        axis in -1e6f64..1e6,
        pixel_min in 0.0f64..500.0,
        pixel_span in 0.0f64..2000.0,
    ) {
        let pixel_max = pixel_min + pixel_span;
        let mid = pixel_min + pixel_span / 2.0;
        let pixel = map_coordinate(value, axis, axis, pixel_min, pixel_max);
        prop_assert!(pixel.is_finite());
        prop_assert_eq!(pixel, mid);
        prop_assert_eq!(map_coordinate_flipped(value, axis, axis, pixel_min, pixel_max), mid);
    }

    #[test]
    fn test_no_jitter_is_identity(
        values in prop::collection::vec(-1e6f64..1e6, 1..50),
        seed in any::<u64>(),
        fraction in 0.0f64..1.0,
    ) {
        let range = PlotRange::new(-1e6, 1e6);
        let mut jitterer = Jitterer::seeded(JitterMode::None, fraction, seed);
        prop_assert_eq!(jitterer.jitter_all(&values, &range), values);
    }

    #[test]
    fn test_qq_table_monotone(
        sample in prop::collection::vec(-1e3f64..1e3, 1..40),
    ) {
        let text = std::iter::once("v".to_string())
            .chain(sample.iter().map(|v| v.to_string()))
            .collect::<Vec<_>>()
            .join("\n");
        let data = CsvReader::from_reader(text.as_bytes(), &CsvOptions::default()).unwrap();
        let data: &dyn TabularData = &data;

        // A one-column dataset is enough for a Q-Q plot.
        let qq = QqPlot::new(data, "v", ConditioningSet::new(), &QuantileSettings::default()).unwrap();
        let theoretical = qq.table().theoretical();
        prop_assert!(theoretical.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(qq.table().observed().windows(2).all(|w| w[0] <= w[1]));
    }
}
