//! Descriptive statistics for simulated samples.
//!
//! # Algorithms
//!
//! - **Mean**: Neumaier compensated summation, error bounded independent of n.
//! - **Mean/Variance**: Welford's online algorithm, population (divide-by-n)
//!   variance. Reference: Welford (1962), "Note on a Method for Calculating
//!   Corrected Sums of Squares and Products", *Technometrics* 4(3).
//! - **Quantile**: nearest rank on a sorted copy, no interpolation. The
//!   returned value is always an observed element of the sample.

use crate::error::{Result, SimError};

/// Arithmetic mean with compensated summation; `None` if `data` is empty
/// or holds a NaN or infinity.
///
/// # Examples
/// ```
/// use simstats::stats::mean;
/// let v = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert!((mean(&v).unwrap() - 3.0).abs() < 1e-15);
/// ```
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() || data.iter().any(|x| !x.is_finite()) {
        return None;
    }
    Some(compensated_sum(data) / data.len() as f64)
}

/// Running mean and population variance of `sample` in one pass.
///
/// # Algorithm
/// The running mean starts at the first element. For each value `x`, in
/// order and including the first:
///
/// ```text
/// n += 1
/// d_old = x − mean
/// mean += d_old / n
/// d_new = x − mean
/// acc  += d_old · d_new
/// ```
///
/// and the result is `(mean, acc / n)`. Starting from the first element
/// keeps every delta small when the mean is large relative to the spread.
///
/// # Errors
/// Returns [`SimError::InvalidArgument`] if `sample` is empty.
///
/// # Examples
/// ```
/// use simstats::stats::mean_variance;
/// let (m, v) = mean_variance(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
/// assert!((m - 5.0).abs() < 1e-15);
/// assert!((v - 4.0).abs() < 1e-12);
/// ```
pub fn mean_variance(sample: &[f64]) -> Result<(f64, f64)> {
    let Some(&first) = sample.first() else {
        return Err(SimError::invalid("mean_variance requires a non-empty sample"));
    };
    let mut running_mean = first;
    let mut count = 0_u64;
    let mut acc = 0.0;
    for &x in sample {
        count += 1;
        let delta_old = x - running_mean;
        running_mean += delta_old / count as f64;
        let delta_new = x - running_mean;
        acc += delta_old * delta_new;
    }
    Ok((running_mean, acc / count as f64))
}

/// Coefficient of variation: population standard deviation over mean.
///
/// # Returns
/// - `None` if `data` is empty or its mean is zero.
///
/// # Examples
/// ```
/// use simstats::stats::coefficient_of_variation;
/// let cv = coefficient_of_variation(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
/// assert!((cv - 0.4).abs() < 1e-12);
/// ```
pub fn coefficient_of_variation(data: &[f64]) -> Option<f64> {
    let (m, var) = mean_variance(data).ok()?;
    if m == 0.0 {
        return None;
    }
    Some(var.sqrt() / m)
}

/// Smallest and largest element, or `None` if `data` is empty or holds a NaN.
pub fn extent(data: &[f64]) -> Option<(f64, f64)> {
    let (&first, rest) = data.split_first()?;
    if first.is_nan() {
        return None;
    }
    rest.iter().try_fold((first, first), |(lo, hi), &x| {
        (!x.is_nan()).then(|| (lo.min(x), hi.max(x)))
    })
}

/// Returns an ascending copy of `data` under IEEE total order.
pub fn sorted_copy(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    sorted
}

/// Computes the `prob`-th empirical quantile by nearest rank.
///
/// # Algorithm
/// 1. Sort a copy of `sample` ascending (the input is left untouched).
/// 2. Let `i = ⌊n × prob⌋`, clamped to `n − 1`.
/// 3. Return `sorted[i]`.
///
/// Unlike the interpolating estimators of R, NumPy or Excel (R-7), the
/// result is always an element of `sample`. For `[1, 2, 3, 4]` at
/// `prob = 0.5` this returns `3.0` where R-7 gives `2.5`.
///
/// # Complexity
/// Time: O(n log n) (dominated by sort), Space: O(n)
///
/// # Errors
/// Returns [`SimError::InvalidArgument`] if `sample` is empty or `prob`
/// is outside `[0, 1]` (including NaN).
///
/// # Examples
/// ```
/// use simstats::stats::quantile;
/// let data = [5.0, 1.0, 4.0, 2.0, 3.0];
/// assert_eq!(quantile(&data, 0.0).unwrap(), 1.0);
/// assert_eq!(quantile(&data, 0.5).unwrap(), 3.0);
/// assert_eq!(quantile(&data, 1.0).unwrap(), 5.0);
/// ```
pub fn quantile(sample: &[f64], prob: f64) -> Result<f64> {
    check_quantile_args(sample.len(), prob)?;
    quantile_sorted(&sorted_copy(sample), prob)
}

/// Computes the nearest-rank quantile on **pre-sorted** data.
///
/// Avoids the O(n log n) sort when reading several quantiles from the
/// same sample. The caller must guarantee that `sorted` is in
/// non-decreasing order.
///
/// # Errors
/// Same conditions as [`quantile`].
pub fn quantile_sorted(sorted: &[f64], prob: f64) -> Result<f64> {
    check_quantile_args(sorted.len(), prob)?;
    let n = sorted.len();
    let i = ((n as f64 * prob).floor() as usize).min(n - 1);
    Ok(sorted[i])
}

fn check_quantile_args(len: usize, prob: f64) -> Result<()> {
    if len == 0 {
        return Err(SimError::invalid("quantile requires a non-empty sample"));
    }
    if !(0.0..=1.0).contains(&prob) {
        return Err(SimError::invalid(format!(
            "quantile probability must lie in [0, 1], got {prob}"
        )));
    }
    Ok(())
}

/// Summary numbers reported for one simulated sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Population variance.
    pub variance: f64,
    /// Population standard deviation over mean; `None` when the mean is 0.
    pub variation: Option<f64>,
    pub lower_quantile: f64,
    pub upper_quantile: f64,
}

/// Computes [`Summary`] statistics, reading both quantiles from a single
/// sorted copy of `sample`.
///
/// # Errors
/// Returns [`SimError::InvalidArgument`] if `sample` is empty or either
/// probability is outside `[0, 1]`.
pub fn summarize(sample: &[f64], lower: f64, upper: f64) -> Result<Summary> {
    let (mean, variance) = mean_variance(sample)?;
    let sorted = sorted_copy(sample);
    let variation = if mean == 0.0 {
        None
    } else {
        Some(variance.sqrt() / mean)
    };
    Ok(Summary {
        count: sample.len(),
        mean,
        variance,
        variation,
        lower_quantile: quantile_sorted(&sorted, lower)?,
        upper_quantile: quantile_sorted(&sorted, upper)?,
    })
}

// ---------------------------------------------------------------------------
// Compensated summation
// ---------------------------------------------------------------------------

/// Running sum with Neumaier's correction term.
///
/// Reference: Neumaier (1974), *ZAMM* 54(1), pp. 39–51.
#[derive(Debug, Clone, Copy, Default)]
struct CompensatedSum {
    total: f64,
    correction: f64,
}

impl CompensatedSum {
    fn add(&mut self, x: f64) {
        let next = self.total + x;
        let (big, small) = if self.total.abs() >= x.abs() {
            (self.total, x)
        } else {
            (x, self.total)
        };
        self.correction += (big - next) + small;
        self.total = next;
    }

    fn value(self) -> f64 {
        self.total + self.correction
    }
}

/// Sum of `data` with compensated rounding error.
pub fn compensated_sum(data: &[f64]) -> f64 {
    let mut sum = CompensatedSum::default();
    data.iter().for_each(|&x| sum.add(x));
    sum.value()
}

// ---------------------------------------------------------------------------
// Running estimate
// ---------------------------------------------------------------------------

/// Streaming mean and variance.
///
/// The incremental form of [`mean_variance`]: values go in one at a time
/// (for example straight out of a simulation loop) and the sample is never
/// stored. Partial estimates combine with [`merge`](Self::merge).
///
/// # Examples
/// ```
/// use simstats::stats::RunningStats;
/// let stats: RunningStats = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter().collect();
/// assert_eq!(stats.len(), 8);
/// assert!((stats.mean().unwrap() - 5.0).abs() < 1e-15);
/// assert!((stats.variance().unwrap() - 4.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStats {
    n: u64,
    mean: f64,
    sum_sq_dev: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one observation.
    pub fn push(&mut self, x: f64) {
        self.n += 1;
        let before = x - self.mean;
        self.mean += before / self.n as f64;
        self.sum_sq_dev += before * (x - self.mean);
    }

    pub fn len(&self) -> u64 {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn mean(&self) -> Option<f64> {
        (self.n > 0).then_some(self.mean)
    }

    /// Population variance (divide by n).
    pub fn variance(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum_sq_dev / self.n as f64)
    }

    /// Unbiased variance (divide by n − 1); needs two observations.
    pub fn sample_variance(&self) -> Option<f64> {
        (self.n > 1).then(|| self.sum_sq_dev / (self.n - 1) as f64)
    }

    pub fn std_dev(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    /// Folds `other` into `self` as if its observations had been pushed here.
    ///
    /// Reference: Chan, Golub & LeVeque (1979), pairwise variance update.
    pub fn merge(&mut self, other: &RunningStats) {
        let n = self.n + other.n;
        if other.n == 0 || n == 0 {
            return;
        }
        let (wa, wb) = (self.n as f64, other.n as f64);
        let gap = other.mean - self.mean;
        self.mean += gap * wb / n as f64;
        self.sum_sq_dev += other.sum_sq_dev + gap * gap * wa * wb / n as f64;
        self.n = n;
    }
}

impl Extend<f64> for RunningStats {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        iter.into_iter().for_each(|x| self.push(x));
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::new();
        stats.extend(iter);
        stats
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        // --- Matches the two-pass reference ---
        #[test]
        fn mean_variance_matches_two_pass(
            data in proptest::collection::vec(-1e3_f64..1e3, 1..200),
            offset in 0.0_f64..1e3,
        ) {
            let data: Vec<f64> = data.iter().map(|x| x + offset).collect();
            let n = data.len() as f64;
            let m_ref = data.iter().sum::<f64>() / n;
            let v_ref = data.iter().map(|x| (x - m_ref) * (x - m_ref)).sum::<f64>() / n;
            let (m, v) = mean_variance(&data).unwrap();
            prop_assert!((m - m_ref).abs() <= 1e-9 * m_ref.abs().max(1.0));
            prop_assert!((v - v_ref).abs() <= 1e-9 * v_ref.max(1.0));
        }

        #[test]
        fn variance_non_negative(data in proptest::collection::vec(-1e6_f64..1e6, 1..100)) {
            let (_, v) = mean_variance(&data).unwrap();
            prop_assert!(v >= 0.0);
        }

        // --- quantile is an observed, in-range value ---
        #[test]
        fn quantile_is_observed(
            data in proptest::collection::vec(-1e6_f64..1e6, 1..100),
            p in 0.0_f64..=1.0,
        ) {
            let q = quantile(&data, p).unwrap();
            prop_assert!(data.contains(&q));
            let (lo, hi) = extent(&data).unwrap();
            prop_assert!(q >= lo && q <= hi);
        }

        #[test]
        fn quantile_extremes_are_min_max(data in proptest::collection::vec(-1e6_f64..1e6, 1..100)) {
            let (lo, hi) = extent(&data).unwrap();
            prop_assert_eq!(quantile(&data, 0.0).unwrap(), lo);
            prop_assert_eq!(quantile(&data, 1.0).unwrap(), hi);
        }

        #[test]
        fn quantiles_monotonic(
            data in proptest::collection::vec(-1e6_f64..1e6, 1..100),
            p1 in 0.0_f64..=1.0,
            p2 in 0.0_f64..=1.0,
        ) {
            let (lo, hi) = if p1 <= p2 { (p1, p2) } else { (p2, p1) };
            prop_assert!(quantile(&data, lo).unwrap() <= quantile(&data, hi).unwrap());
        }

        // --- merging partial estimates equals one pass over everything ---
        #[test]
        fn merge_equals_single_pass(
            left in proptest::collection::vec(-1e6_f64..1e6, 1..50),
            right in proptest::collection::vec(-1e6_f64..1e6, 1..50),
        ) {
            let whole: RunningStats = left.iter().chain(&right).copied().collect();
            let mut merged: RunningStats = left.iter().copied().collect();
            merged.merge(&right.iter().copied().collect());

            let (m1, m2) = (whole.mean().unwrap(), merged.mean().unwrap());
            prop_assert!((m1 - m2).abs() < 1e-8 * m1.abs().max(1.0));
            let (v1, v2) = (whole.variance().unwrap(), merged.variance().unwrap());
            prop_assert!((v1 - v2).abs() < 1e-8 * v1.max(1.0));
        }
    }
}
