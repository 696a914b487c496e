use std::collections::HashMap;

use serde::Serialize;

use crate::processing::statistics::{round_decimals, ProcessStats};
use crate::profiles::ViewProfile;
use crate::state::view_window::ViewWindow;

/// One histogram bar: bin midpoint, count, tooltip label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub x: f64,
    pub y: u64,
    pub label: String,
}

/// Chart-feed output for one (switch, test-type) sample set.
///
/// The four series stack into a single bar chart; `min_view`/`max_view`/
/// `min_pass`/`max_pass`/`step_size` pass through for axis and limit-line
/// configuration, and `max_frequency` scales the frequency axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramDataSet {
    pub pass_array: Vec<Bucket>,
    pub fail_array: Vec<Bucket>,
    pub overflow_array: Vec<Bucket>,
    pub underflow_array: Vec<Bucket>,
    /// Bin width, for axis tick spacing.
    pub step_size: f64,
    /// Highest in-window bar count, rounded up to a multiple of 5.
    /// Overflow/underflow bars do not participate.
    pub max_frequency: u64,
    pub min_view: f64,
    pub max_view: f64,
    pub min_pass: Option<f64>,
    pub max_pass: Option<f64>,
    #[serde(flatten)]
    pub stats: ProcessStats,
}

/// Accumulates counts per bin midpoint. Midpoints are produced by one
/// deterministic computation, so bit-identical keys are guaranteed.
#[derive(Default)]
struct BucketAccum(HashMap<u64, Bucket>);

impl BucketAccum {
    fn hit(&mut self, x: f64, label: impl FnOnce() -> String) {
        self.0
            .entry(x.to_bits())
            .or_insert_with(|| Bucket { x, y: 0, label: label() })
            .y += 1;
    }

    fn into_sorted(self) -> Vec<Bucket> {
        let mut buckets: Vec<Bucket> = self.0.into_values().collect();
        buckets.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
        buckets
    }
}

/// Bucket a sample set against a resolved view profile and the currently
/// visible window.
///
/// Pure and deterministic: identical inputs give identical output. Every
/// pan/zoom re-runs the full pass over the original samples so that the
/// overflow/underflow edge buckets always track the visible range; there
/// is no incremental update. Null samples are dropped up front; each
/// remaining value lands in exactly one of the four series.
pub fn build(samples: &[Option<f64>], profile: &ViewProfile, view: ViewWindow) -> HistogramDataSet {
    let values: Vec<f64> = samples
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();

    let stats = ProcessStats::compute(&values, profile.min_pass, profile.max_pass);

    let bin = profile.bin_size;
    let mut pass = BucketAccum::default();
    let mut fail = BucketAccum::default();
    let mut overflow = BucketAccum::default();
    let mut underflow = BucketAccum::default();

    for &value in &values {
        if value > view.max {
            overflow.hit(view.max + bin / 2.0, || {
                format!("> {}", round_decimals(view.max, 2))
            });
            continue;
        }
        if value < view.min {
            underflow.hit(view.min - bin / 2.0, || {
                format!("< {}", round_decimals(view.min, 2))
            });
            continue;
        }

        let mut lo = (value / bin).floor() * bin;
        let mut hi = lo + bin;

        // The pass limits must land on a bin edge: a bin that straddles a
        // limit is resized to end exactly on it. At most one branch fires
        // for a given value; the order and comparison operators are
        // load-bearing.
        let min_pass = profile.min_pass;
        let max_pass = profile.max_pass;
        if let Some(mp) = min_pass.filter(|&mp| lo <= mp && mp <= value) {
            lo = mp;
            hi = ((mp + bin) / bin).floor() * bin;
        } else if let Some(xp) = max_pass.filter(|&xp| lo < xp && xp <= hi && value <= xp) {
            hi = xp;
            lo = ((xp - bin) / bin).floor() * bin;
        } else if let Some(xp) = max_pass.filter(|&xp| value > xp && lo <= xp) {
            lo = xp;
            hi = ((xp + bin) / bin).floor() * bin;
        } else if let Some(mp) = min_pass.filter(|&mp| value < mp && hi >= mp) {
            hi = mp;
            lo = ((mp - bin) / bin).floor() * bin;
        }

        // Measurements are non-negative magnitudes; a snapped edge below
        // zero collapses to zero.
        if lo < 0.0 {
            lo = 0.0;
        }

        lo = round_decimals(lo, 4);
        hi = round_decimals(hi, 4);

        let mid = (lo + hi) / 2.0;
        let is_fail = profile.min_pass.is_some_and(|mp| lo < mp)
            || profile.max_pass.is_some_and(|xp| hi > xp);

        let series = if is_fail { &mut fail } else { &mut pass };
        series.hit(mid, || format!("{lo} - {hi}"));
    }

    let pass_array = pass.into_sorted();
    let fail_array = fail.into_sorted();

    let peak = pass_array
        .iter()
        .chain(fail_array.iter())
        .map(|b| b.y)
        .max()
        .unwrap_or(0);
    let max_frequency = peak.div_ceil(5) * 5;

    HistogramDataSet {
        pass_array,
        fail_array,
        overflow_array: overflow.into_sorted(),
        underflow_array: underflow.into_sorted(),
        step_size: bin,
        max_frequency,
        min_view: profile.min_view,
        max_view: profile.max_view,
        min_pass: profile.min_pass,
        max_pass: profile.max_pass,
        stats,
    }
}

impl HistogramDataSet {
    /// Total count across all four series.
    pub fn sample_count(&self) -> u64 {
        [
            &self.pass_array,
            &self.fail_array,
            &self.overflow_array,
            &self.underflow_array,
        ]
        .iter()
        .flat_map(|series| series.iter())
        .map(|b| b.y)
        .sum()
    }
}
