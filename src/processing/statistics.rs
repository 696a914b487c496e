use serde::Serialize;

/// Round to a fixed number of decimal places.
pub(crate) fn round_decimals(value: f64, decimals: u32) -> f64 {
    let power = 10f64.powi(decimals as i32);
    (value * power).round() / power
}

/// Process-capability statistics for one sample set, computed over all
/// non-null values regardless of the visible chart range.
///
/// All fields are rounded to 2 decimals for display; the unrounded values
/// are not exposed. With fewer than 2 samples `mean`/`sigma` come out as
/// NaN rather than an error; callers check finiteness before display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProcessStats {
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (n-1 divisor).
    pub sigma: f64,
    /// (USL - mean) / 3*sigma. USL defaults to +inf when no upper limit.
    pub ucpk: f64,
    /// (mean - LSL) / 3*sigma. Absent when there is no lower limit.
    pub lcpk: Option<f64>,
    /// Smaller of the capability bounds that exist; absent without limits.
    pub cpk: Option<f64>,
}

impl ProcessStats {
    /// Compute statistics from already-filtered sample values against the
    /// pass limits of the test (`min_pass` as LSL, `max_pass` as USL).
    pub fn compute(values: &[f64], min_pass: Option<f64>, max_pass: Option<f64>) -> Self {
        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        // 0/0 with fewer than 2 samples: mean/sigma degenerate to NaN.
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
            / n.saturating_sub(1) as f64;
        let sigma = variance.sqrt();

        let usl = max_pass.unwrap_or(f64::INFINITY);
        let ucpk = (usl - mean) / (3.0 * sigma);
        let lcpk = min_pass.map(|lsl| (mean - lsl) / (3.0 * sigma));

        let cpk = match (max_pass, lcpk) {
            (Some(_), Some(l)) => Some(ucpk.min(l)),
            (Some(_), None) => Some(ucpk),
            (None, Some(l)) => Some(l),
            (None, None) => None,
        };

        ProcessStats {
            mean: round_decimals(mean, 2),
            sigma: round_decimals(sigma, 2),
            ucpk: round_decimals(ucpk, 2),
            lcpk: lcpk.map(|v| round_decimals(v, 2)),
            cpk: cpk.map(|v| round_decimals(v, 2)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_sigma_known_values() {
        // mean 5, sample sigma sqrt(10/4) ~ 1.5811 -> 1.58
        let stats = ProcessStats::compute(&[3.0, 4.0, 5.0, 6.0, 7.0], None, None);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.sigma, 1.58);
        assert_eq!(stats.cpk, None);
    }

    #[test]
    fn two_sided_cpk_takes_the_smaller_bound() {
        // Mean sits closer to the upper limit, so ucpk is the binding side.
        let values = [9.0, 10.0, 11.0, 10.0, 9.0, 11.0, 10.0];
        let stats = ProcessStats::compute(&values, Some(4.0), Some(13.0));
        let lcpk = stats.lcpk.unwrap();
        assert!(stats.ucpk < lcpk);
        assert_eq!(stats.cpk, Some(stats.ucpk));
    }

    #[test]
    fn upper_limit_only_has_no_lcpk() {
        let values = [9.0, 10.0, 11.0, 10.0];
        let stats = ProcessStats::compute(&values, None, Some(13.0));
        assert_eq!(stats.lcpk, None);
        assert_eq!(stats.cpk, Some(stats.ucpk));
    }

    #[test]
    fn no_upper_limit_pushes_ucpk_to_infinity() {
        let values = [9.0, 10.0, 11.0, 10.0];
        let stats = ProcessStats::compute(&values, Some(4.0), None);
        assert!(stats.ucpk.is_infinite());
        assert_eq!(stats.cpk, stats.lcpk);
    }

    #[test]
    fn degenerate_inputs_produce_nan_not_panic() {
        let empty = ProcessStats::compute(&[], Some(1.0), Some(2.0));
        assert!(empty.mean.is_nan());
        assert!(empty.sigma.is_nan());

        let single = ProcessStats::compute(&[5.0], Some(1.0), Some(2.0));
        assert_eq!(single.mean, 5.0);
        assert!(single.sigma.is_nan());
        assert!(single.ucpk.is_nan());
    }

    #[test]
    fn values_round_to_two_decimals() {
        let values = [1.0, 2.0, 2.0];
        let stats = ProcessStats::compute(&values, None, None);
        // mean 5/3 = 1.666... -> 1.67
        assert_eq!(stats.mean, 1.67);
    }

    #[test]
    fn round_decimals_places() {
        assert_eq!(round_decimals(1.23456, 2), 1.23);
        assert_eq!(round_decimals(10.0, 2), 10.0);
        assert!(round_decimals(f64::NAN, 2).is_nan());
        assert_eq!(round_decimals(f64::INFINITY, 2), f64::INFINITY);
    }
}
