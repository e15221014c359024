//! N-tile breakpoints
//!
//! Splits a sample into `n` buckets of roughly equal size. Runs of equal
//! values are never split: a run goes into the current bucket when at least
//! half of it fits, otherwise it starts the next one.

use crate::error::{StatsError, StatsResult};
use crate::summary::non_missing;

/// Smallest and largest supported bucket counts
pub const NTILE_RANGE: std::ops::RangeInclusive<usize> = 2..=10;

/// Display names for 1..=10 buckets
pub const NTILE_NAMES: [&str; 10] = [
    "1-tile", "2-tile", "tertile", "quartile", "quintile", "sextile", "septile", "octile",
    "nontile", "decile",
];

/// Name for an n-tile, e.g. "quartile" for 4
pub fn ntile_name(ntile: usize) -> Option<&'static str> {
    ntile.checked_sub(1).and_then(|i| NTILE_NAMES.get(i).copied())
}

/// Compute `ntile + 1` breakpoints including min and max
pub fn ntile_breakpoints(data: &[f64], ntile: usize) -> StatsResult<Vec<f64>> {
    if !NTILE_RANGE.contains(&ntile) {
        return Err(StatsError::NtileOutOfRange(ntile));
    }

    let mut sorted = non_missing(data);
    if sorted.is_empty() {
        return Err(StatsError::EmptySample);
    }
    sorted.sort_by(f64::total_cmp);

    let min = sorted[0];
    let max = sorted[sorted.len() - 1];

    // Bucket size uses whole-row division.
    let interval = (sorted.len() / ntile) as f64;

    let mut breakpoints = vec![max; ntile + 1];
    breakpoints[0] = min;
    let mut current = 1;
    let mut freq = 0usize;

    for (count, value) in runs(&sorted) {
        let half = count / 2;
        if ((freq + half) as f64) <= interval {
            freq += count;
        } else {
            freq = count;
        }

        if interval <= freq as f64 {
            freq = 0;
            if current < breakpoints.len() {
                breakpoints[current] = value;
                current += 1;
            }
        }
    }

    Ok(breakpoints)
}

/// The `[low, high]` interval of bucket `index` (1-based) out of `ntile`
pub fn ntile_interval(data: &[f64], ntile: usize, index: usize) -> StatsResult<(f64, f64)> {
    if index == 0 || index > ntile {
        return Err(StatsError::NtileIndexOutOfRange { ntile, index });
    }
    let breakpoints = ntile_breakpoints(data, ntile)?;
    Ok((breakpoints[index - 1], breakpoints[index]))
}

/// (run length, value) for each run of equal values in sorted data
fn runs(sorted: &[f64]) -> Vec<(usize, f64)> {
    let mut out: Vec<(usize, f64)> = Vec::new();
    for &value in sorted {
        match out.last_mut() {
            Some((count, last)) if *last == value => *count += 1,
            _ => out.push((1, value)),
        }
    }
    out
}
