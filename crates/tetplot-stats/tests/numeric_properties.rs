//! Property-based tests for the numeric utilities

use proptest::prelude::*;
use tetplot_stats::{
    fit_line, ntile_breakpoints, JitterMode, Jitterer, PlotRange, QuantileSearch, QuantileTable,
    DEFAULT_SEARCH_WIDTH_SD,
};

proptest! {
    #[test]
    fn test_exact_line_is_recovered(
        intercept in -100.0f64..100.0,
        slope in -10.0f64..10.0,
        xs in prop::collection::btree_set(-50i32..50, 2..30),
    ) {
        let x: Vec<f64> = xs.into_iter().map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| intercept + slope * v).collect();
        let line = fit_line(&x, &y).unwrap();
        prop_assert!((line.slope - slope).abs() < 1e-7, "slope {} vs {}", line.slope, slope);
        prop_assert!((line.intercept - intercept).abs() < 1e-6, "intercept {} vs {}", line.intercept, intercept);
        prop_assert_eq!(line.n, x.len());
    }

    #[test]
    fn test_range_contains_sample(sample in prop::collection::vec(-1e6f64..1e6, 1..60)) {
        let range = PlotRange::from_sample(&sample).unwrap();
        prop_assert!(range.min <= range.max);
        prop_assert!(sample.iter().all(|&v| range.contains(v)));
        prop_assert!(sample.contains(&range.min) && sample.contains(&range.max));
    }

    #[test]
    fn test_uniform_jitter_in_band(
        value in -1e3f64..1e3,
        span in 0.1f64..1e3,
        seed in any::<u64>(),
    ) {
        let range = PlotRange::new(0.0, span);
        let mut jitterer = Jitterer::seeded(JitterMode::Uniform, 0.03, seed);
        let moved = jitterer.jitter(value, &range);
        prop_assert!((moved - value).abs() <= 2.0 * 0.03 * span + 1e-9);
    }

    #[test]
    fn test_ntile_breakpoints_sorted(
        sample in prop::collection::vec(-100i32..100, 10..80),
        ntile in 2usize..=10,
    ) {
        let data: Vec<f64> = sample.into_iter().map(f64::from).collect();
        let breakpoints = ntile_breakpoints(&data, ntile).unwrap();
        prop_assert_eq!(breakpoints.len(), ntile + 1);
        prop_assert!(breakpoints.windows(2).all(|w| w[0] <= w[1]));

        let min = data.iter().copied().fold(f64::INFINITY, f64::min);
        let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(breakpoints[0], min);
        prop_assert!(breakpoints.iter().all(|&b| b <= max));
    }

    #[test]
    fn test_quantile_table_shape(sample in prop::collection::vec(-50.0f64..50.0, 1..40)) {
        let table = QuantileTable::build(&sample, &QuantileSearch::default(), DEFAULT_SEARCH_WIDTH_SD).unwrap();
        prop_assert_eq!(table.len(), sample.len());
        prop_assert!(table.theoretical().windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(table.theoretical().iter().all(|t| t.is_finite()));
    }
}
