//! Statistics Calculator Module
//! Descriptive statistics, Pearson correlation, histogram binning and
//! Gaussian kernel density estimation.

use statrs::distribution::{Continuous, Normal};
use thiserror::Error;

/// Upper bound on histogram bins; wider spreads are binned at this count.
pub const MAX_BINS: usize = 1_000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BinningError {
    #[error("cannot bin non-finite value {0}")]
    NonFinite(f64),
    #[error("value span {lo}..{hi} overflows f64")]
    SpanOverflow { lo: f64, hi: f64 },
}

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Default for DescriptiveStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        }
    }
}

impl DescriptiveStats {
    /// Row labels in the order `values()` returns them.
    pub const LABELS: [&'static str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    pub fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
    }
}

/// Equal-width histogram bins.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` ascending edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match self.edges.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Stateless statistical helpers.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    ///
    /// `std` is the sample standard deviation (n - 1), NaN for a single value.
    pub fn compute_descriptive_stats(values: &[f64]) -> DescriptiveStats {
        let n = values.len();
        if n == 0 {
            return DescriptiveStats::default();
        }

        let sorted = Self::sorted(values);
        let mean = values.iter().sum::<f64>() / n as f64;
        let std = Self::sample_variance(values, mean).sqrt();

        DescriptiveStats {
            count: n,
            mean,
            std,
            min: sorted[0],
            q25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            q75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    fn sorted(values: &[f64]) -> Vec<f64> {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        sorted
    }

    fn sample_variance(values: &[f64], mean: f64) -> f64 {
        let n = values.len();
        if n < 2 {
            return f64::NAN;
        }
        values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Pearson correlation over pairwise-complete observations.
    ///
    /// NaN when fewer than two complete pairs exist, either side is constant
    /// or any paired value is infinite.
    pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
        let pairs: Vec<(f64, f64)> = x
            .iter()
            .zip(y)
            .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
            .collect();

        let n = pairs.len();
        if n < 2 || pairs.iter().any(|(a, b)| !a.is_finite() || !b.is_finite()) {
            return f64::NAN;
        }

        let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n as f64;
        let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n as f64;

        let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
        for (a, b) in &pairs {
            let dx = a - mean_x;
            let dy = b - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        if var_x == 0.0 || var_y == 0.0 {
            return f64::NAN;
        }

        (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
    }

    /// Bin values with NumPy's `auto` rule: the smaller of the Sturges and
    /// Freedman-Diaconis widths, Sturges alone when the IQR is zero.
    ///
    /// The bin count is capped at [`MAX_BINS`]. Infinite values cannot be
    /// binned and are rejected.
    pub fn histogram(values: &[f64]) -> Result<Histogram, BinningError> {
        let n = values.len();
        if n == 0 {
            return Ok(Histogram {
                edges: vec![0.0, 1.0],
                counts: vec![0],
            });
        }
        if let Some(&bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(BinningError::NonFinite(bad));
        }

        let sorted = Self::sorted(values);
        let (mut lo, mut hi) = (sorted[0], sorted[n - 1]);
        let range = hi - lo;
        if !range.is_finite() {
            return Err(BinningError::SpanOverflow { lo, hi });
        }

        let bins = if range == 0.0 {
            lo -= 0.5;
            hi += 0.5;
            1
        } else {
            let sturges = range / ((n as f64).log2() + 1.0);
            let iqr = Self::percentile(&sorted, 75.0) - Self::percentile(&sorted, 25.0);
            let fd = 2.0 * iqr / (n as f64).cbrt();
            let width = if fd > 0.0 { fd.min(sturges) } else { sturges };
            (range / width).ceil().clamp(1.0, MAX_BINS as f64) as usize
        };

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * width).collect();

        let mut counts = vec![0usize; bins];
        for &v in values {
            // Right-most edge is inclusive.
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Ok(Histogram { edges, counts })
    }

    /// Gaussian KDE bandwidth by Scott's rule, `None` when the data is singular.
    pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
        let n = values.len();
        if n < 2 {
            return None;
        }
        let mean = values.iter().sum::<f64>() / n as f64;
        let std = Self::sample_variance(values, mean).sqrt();
        if !std.is_finite() || std == 0.0 {
            return None;
        }
        Some(std * (n as f64).powf(-0.2))
    }

    /// Evaluate a Gaussian KDE of `values` on an evenly spaced grid over
    /// `[from, to]`. Returns `(x, density)` points, empty for singular or
    /// non-finite data.
    pub fn kde(values: &[f64], from: f64, to: f64, points: usize) -> Vec<(f64, f64)> {
        let Some(bandwidth) = Self::scott_bandwidth(values) else {
            return Vec::new();
        };
        let Ok(kernel) = Normal::new(0.0, bandwidth) else {
            return Vec::new();
        };

        let n = values.len() as f64;
        let steps = points.max(2) - 1;
        let step = (to - from) / steps as f64;

        (0..=steps)
            .map(|i| {
                let x = from + i as f64 * step;
                let density = values.iter().map(|v| kernel.pdf(x - v)).sum::<f64>() / n;
                (x, density)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn describe_matches_known_values() {
        let stats = StatsCalculator::compute_descriptive_stats(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(stats.count, 4);
        assert!((stats.mean - 2.5).abs() < EPS);
        assert!((stats.std - 1.290_994_448_735_805_6).abs() < EPS);
        assert_eq!(stats.min, 1.0);
        assert!((stats.q25 - 1.75).abs() < EPS);
        assert!((stats.median - 2.5).abs() < EPS);
        assert!((stats.q75 - 3.25).abs() < EPS);
        assert_eq!(stats.max, 4.0);
    }

    #[test]
    fn describe_single_value_has_nan_std() {
        let stats = StatsCalculator::compute_descriptive_stats(&[7.0]);
        assert_eq!(stats.count, 1);
        assert!(stats.std.is_nan());
        assert_eq!(stats.median, 7.0);
    }

    #[test]
    fn describe_empty_is_all_nan() {
        let stats = StatsCalculator::compute_descriptive_stats(&[]);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan());
        assert!(stats.max.is_nan());
    }

    #[test]
    fn pearson_perfect_and_inverse() {
        let x = [Some(1.0), Some(2.0), Some(3.0)];
        let y = [Some(2.0), Some(4.0), Some(6.0)];
        let z = [Some(3.0), Some(2.0), Some(1.0)];
        assert!((StatsCalculator::pearson(&x, &y) - 1.0).abs() < EPS);
        assert!((StatsCalculator::pearson(&x, &z) + 1.0).abs() < EPS);
    }

    #[test]
    fn pearson_skips_incomplete_pairs() {
        let x = [Some(1.0), None, Some(2.0), Some(3.0)];
        let y = [Some(1.0), Some(100.0), Some(2.0), None];
        // Only (1,1) and (2,2) are complete.
        assert!((StatsCalculator::pearson(&x, &y) - 1.0).abs() < EPS);
    }

    #[test]
    fn pearson_constant_is_nan() {
        let x = [Some(1.0), Some(1.0), Some(1.0)];
        let y = [Some(1.0), Some(2.0), Some(3.0)];
        assert!(StatsCalculator::pearson(&x, &y).is_nan());
    }

    #[test]
    fn pearson_with_infinite_value_is_nan() {
        let x = [Some(1.0), Some(2.0), Some(f64::INFINITY), Some(4.0)];
        let y = [Some(1.0), Some(3.0), Some(2.0), Some(5.0)];
        assert!(StatsCalculator::pearson(&x, &y).is_nan());
        assert!(StatsCalculator::pearson(&y, &x).is_nan());

        // A pair dropped for being incomplete does not poison the result.
        let x = [Some(1.0), Some(2.0), Some(3.0), None];
        let y = [Some(2.0), Some(4.0), Some(6.0), Some(f64::NEG_INFINITY)];
        assert!((StatsCalculator::pearson(&x, &y) - 1.0).abs() < EPS);
    }

    #[test]
    fn pearson_handles_wide_spread() {
        let x = [Some(0.0), Some(1.0), Some(2.0), Some(1e15)];
        let y = [Some(0.0), Some(1.0), Some(2.0), Some(1e15)];
        assert!((StatsCalculator::pearson(&x, &y) - 1.0).abs() < EPS);
    }

    #[test]
    fn histogram_covers_every_value() {
        let values: Vec<f64> = (0..100).map(|i| (i % 17) as f64 * 0.5).collect();
        let hist = StatsCalculator::histogram(&values).unwrap();
        assert_eq!(hist.edges.len(), hist.counts.len() + 1);
        assert_eq!(hist.counts.iter().sum::<usize>(), values.len());
        assert_eq!(hist.edges[0], 0.0);
        assert!((hist.edges[hist.edges.len() - 1] - 8.0).abs() < EPS);
    }

    #[test]
    fn histogram_constant_column_is_single_unit_bin() {
        let hist = StatsCalculator::histogram(&[3.0, 3.0, 3.0]).unwrap();
        assert_eq!(hist.counts, vec![3]);
        assert_eq!(hist.edges, vec![2.5, 3.5]);
    }

    #[test]
    fn histogram_rejects_infinite_values() {
        assert_eq!(
            StatsCalculator::histogram(&[1.0, 2.0, 3.0, 4.0, f64::INFINITY]),
            Err(BinningError::NonFinite(f64::INFINITY))
        );
        assert_eq!(
            StatsCalculator::histogram(&[f64::NEG_INFINITY, 0.0]),
            Err(BinningError::NonFinite(f64::NEG_INFINITY))
        );
    }

    #[test]
    fn histogram_rejects_overflowing_span() {
        let err = StatsCalculator::histogram(&[-f64::MAX, 0.0, f64::MAX]).unwrap_err();
        assert!(matches!(err, BinningError::SpanOverflow { .. }));
    }

    #[test]
    fn histogram_caps_bins_for_extreme_outlier() {
        let mut values: Vec<f64> = (0..1000).map(|i| i as f64 / 1000.0).collect();
        values.push(1e15);

        let hist = StatsCalculator::histogram(&values).unwrap();

        assert_eq!(hist.counts.len(), MAX_BINS);
        assert_eq!(hist.edges.len(), MAX_BINS + 1);
        assert_eq!(hist.counts.iter().sum::<usize>(), values.len());
        assert_eq!(hist.counts[0], 1000);
        assert_eq!(hist.counts[MAX_BINS - 1], 1);
        assert_eq!(hist.edges[0], 0.0);
        assert!((hist.edges[MAX_BINS] - 1e15).abs() < 1.0);
    }

    #[test]
    fn histogram_of_nothing_is_one_empty_bin() {
        let hist = StatsCalculator::histogram(&[]).unwrap();
        assert_eq!(hist.counts, vec![0]);
        assert_eq!(hist.max_count(), 0);
    }

    #[test]
    fn kde_integrates_to_about_one() {
        let values = [1.0, 2.0, 2.5, 3.0, 4.0, 4.5, 6.0];
        let grid = StatsCalculator::kde(&values, -10.0, 20.0, 601);
        let step = grid[1].0 - grid[0].0;
        let area: f64 = grid.iter().map(|(_, d)| d * step).sum();
        assert!((area - 1.0).abs() < 1e-3);
    }

    #[test]
    fn kde_skips_singular_data() {
        assert!(StatsCalculator::kde(&[5.0, 5.0], 0.0, 10.0, 50).is_empty());
        assert!(StatsCalculator::kde(&[5.0], 0.0, 10.0, 50).is_empty());
    }

    #[test]
    fn kde_skips_non_finite_data() {
        let values = [1.0, 2.0, f64::INFINITY];
        assert!(StatsCalculator::scott_bandwidth(&values).is_none());
        assert!(StatsCalculator::kde(&values, 0.0, 10.0, 50).is_empty());
    }

    #[test]
    fn kde_stays_finite_for_wide_spread() {
        let mut values: Vec<f64> = (0..1000).map(|i| i as f64 / 1000.0).collect();
        values.push(1e15);

        let grid = StatsCalculator::kde(&values, 0.0, 1e15, 50);

        assert_eq!(grid.len(), 50);
        assert!(grid.iter().all(|(x, d)| x.is_finite() && d.is_finite() && *d >= 0.0));
    }
}
