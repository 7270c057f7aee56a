//! Probability distributions used by the simulations.
//!
//! Distribution types with analytical moments and inverse-transform
//! sampling from an injected random source.
//!
//! # Supported Distributions
//!
//! | Distribution | Parameters | Mean | Variance |
//! |---|---|---|---|
//! | [`Exponential`] | mean θ | θ | θ² |
//! | [`CorrelatedLogNormal`] | μ (vector), Σ (matrix) | exp(μᵢ+Σᵢᵢ/2) | (exp(Σᵢᵢ)−1)·exp(2μᵢ+Σᵢᵢ) |
//!
//! # Design Notes
//!
//! The exponential distribution is parameterized by its **mean**, not its
//! rate, matching how workstation and repair times are specified.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use thiserror::Error;

use crate::random::uniform01;

/// Error type for invalid distribution parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistributionError {
    /// Parameters violate distribution constraints.
    #[error("invalid distribution parameters: {0}")]
    InvalidParameters(String),
}

// ============================================================================
// Exponential Distribution
// ============================================================================

/// Exponential distribution with mean θ (rate λ = 1/θ).
///
/// # Mathematical Definition
/// - PDF: f(x) = (1/θ) exp(−x/θ) for x ≥ 0
/// - CDF: F(x) = 1 − exp(−x/θ)
/// - Inverse CDF: F⁻¹(p) = −θ ln(1 − p)
/// - Mean: θ
/// - Variance: θ²
///
/// # Sampling
/// Inverse-transform: for `u` uniform on `[0, 1)`, `−θ ln(1 − u)` is an
/// exact Exponential(θ) variate. `1 − u` lies in `(0, 1]`, so the logarithm
/// is always finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exponential {
    mean: f64,
}

impl Exponential {
    /// Creates an exponential distribution with the given mean.
    ///
    /// # Errors
    /// Returns `Err` if `mean ≤ 0` or is not finite.
    pub fn new(mean: f64) -> Result<Self, DistributionError> {
        if !mean.is_finite() || mean <= 0.0 {
            return Err(DistributionError::InvalidParameters(format!(
                "Exponential requires a finite mean > 0, got mean={mean}"
            )));
        }
        Ok(Self { mean })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn rate(&self) -> f64 {
        1.0 / self.mean
    }

    pub fn variance(&self) -> f64 {
        self.mean * self.mean
    }

    /// Standard deviation, equal to the mean.
    pub fn std_dev(&self) -> f64 {
        self.mean
    }

    /// Median = θ ln 2.
    pub fn median(&self) -> f64 {
        self.mean * std::f64::consts::LN_2
    }

    pub fn pdf(&self, x: f64) -> f64 {
        if x < 0.0 {
            0.0
        } else {
            (-x / self.mean).exp() / self.mean
        }
    }

    /// CDF: 1 − exp(−x/θ), zero for negative `x`.
    pub fn cdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            0.0
        } else {
            -(-x / self.mean).exp_m1()
        }
    }

    /// Inverse CDF: −θ ln(1 − p).
    ///
    /// Returns `None` if `p` is outside `[0, 1)`.
    pub fn quantile(&self, p: f64) -> Option<f64> {
        if !(0.0..1.0).contains(&p) {
            return None;
        }
        Some(self.inverse_cdf(p))
    }

    #[inline]
    fn inverse_cdf(&self, p: f64) -> f64 {
        -self.mean * (1.0 - p).ln()
    }

    /// Draws one variate by inverse-transform sampling.
    #[inline]
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        self.inverse_cdf(uniform01(rng))
    }

    /// Fills `out` with independent variates.
    pub fn fill<R: Rng>(&self, out: &mut [f64], rng: &mut R) {
        for slot in out.iter_mut() {
            *slot = self.sample(rng);
        }
    }
}

// ============================================================================
// Correlated LogNormal Distribution
// ============================================================================

/// Multivariate log-normal distribution.
///
/// `S = exp(X)` componentwise, where `X ~ N(μ, Σ)`. Correlated normals are
/// built as `X = μ + L·Z` with `L` the Cholesky factor of `Σ` and `Z` a
/// vector of independent standard normals.
///
/// # Marginals
/// Each `Sᵢ` is LogNormal(μᵢ, Σᵢᵢ):
/// - Mean: exp(μᵢ + Σᵢᵢ/2)
/// - Variance: (exp(Σᵢᵢ) − 1) · exp(2μᵢ + Σᵢᵢ)
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelatedLogNormal {
    mu: Vec<f64>,
    covariance: Vec<Vec<f64>>,
    cholesky: Vec<Vec<f64>>,
}

impl CorrelatedLogNormal {
    /// Creates the distribution from log-space means and covariance.
    ///
    /// # Errors
    /// Returns `Err` if `mu` is empty, dimensions disagree, any entry is
    /// not finite, or `covariance` is not symmetric positive definite.
    pub fn new(mu: Vec<f64>, covariance: Vec<Vec<f64>>) -> Result<Self, DistributionError> {
        let n = mu.len();
        if n == 0 {
            return Err(DistributionError::InvalidParameters(
                "CorrelatedLogNormal requires at least one component".into(),
            ));
        }
        if covariance.len() != n || covariance.iter().any(|row| row.len() != n) {
            return Err(DistributionError::InvalidParameters(format!(
                "covariance must be {n}x{n} to match μ"
            )));
        }
        if !mu.iter().chain(covariance.iter().flatten()).all(|v| v.is_finite()) {
            return Err(DistributionError::InvalidParameters(
                "CorrelatedLogNormal parameters must be finite".into(),
            ));
        }
        for i in 0..n {
            for j in 0..i {
                let (a, b) = (covariance[i][j], covariance[j][i]);
                if (a - b).abs() > 1e-12 * a.abs().max(b.abs()).max(1.0) {
                    return Err(DistributionError::InvalidParameters(format!(
                        "covariance is not symmetric at ({i}, {j}): {a} vs {b}"
                    )));
                }
            }
        }
        let cholesky = cholesky(&covariance)?;
        Ok(Self {
            mu,
            covariance,
            cholesky,
        })
    }

    /// Number of components.
    pub fn dim(&self) -> usize {
        self.mu.len()
    }

    pub fn mu(&self) -> &[f64] {
        &self.mu
    }

    pub fn covariance(&self) -> &[Vec<f64>] {
        &self.covariance
    }

    /// Lower-triangular factor `L` with `L·Lᵀ = Σ`.
    pub fn cholesky_factor(&self) -> &[Vec<f64>] {
        &self.cholesky
    }

    /// Mean of component `i`: exp(μᵢ + Σᵢᵢ/2). `None` if out of range.
    pub fn marginal_mean(&self, i: usize) -> Option<f64> {
        let m = *self.mu.get(i)?;
        Some((m + self.covariance[i][i] / 2.0).exp())
    }

    /// Variance of component `i`. `None` if out of range.
    pub fn marginal_variance(&self, i: usize) -> Option<f64> {
        let m = *self.mu.get(i)?;
        let s2 = self.covariance[i][i];
        Some((s2.exp() - 1.0) * (2.0 * m + s2).exp())
    }

    /// Draws one vector `S`.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        let z: Vec<f64> = (0..self.dim())
            .map(|_| -> f64 { StandardNormal.sample(rng) })
            .collect();
        self.cholesky
            .iter()
            .zip(&self.mu)
            .map(|(row, &m)| {
                let x: f64 = row.iter().zip(&z).map(|(l, zi)| l * zi).sum();
                (m + x).exp()
            })
            .collect()
    }
}

/// Cholesky–Banachiewicz decomposition of a symmetric positive definite
/// matrix.
///
/// # Errors
/// Returns `Err` if `a` is not square or a pivot is not strictly positive.
pub fn cholesky(a: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, DistributionError> {
    let n = a.len();
    if let Some((i, row)) = a.iter().enumerate().find(|(_, row)| row.len() != n) {
        return Err(DistributionError::InvalidParameters(format!(
            "matrix must be square: row {i} has {} entries, expected {n}",
            row.len()
        )));
    }
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let s: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();
            if i == j {
                let pivot = a[i][i] - s;
                if pivot <= 0.0 || !pivot.is_finite() {
                    return Err(DistributionError::InvalidParameters(format!(
                        "covariance is not positive definite (pivot {i} = {pivot})"
                    )));
                }
                l[i][j] = pivot.sqrt();
            } else {
                l[i][j] = (a[i][j] - s) / l[j][j];
            }
        }
    }
    Ok(l)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use crate::stats::{mean, RunningStats};

    // --- Exponential ---

    #[test]
    fn test_exponential_moments() {
        let e = Exponential::new(180.0).unwrap();
        assert_eq!(e.mean(), 180.0);
        assert_eq!(e.std_dev(), 180.0);
        assert!((e.variance() - 32400.0).abs() < 1e-9);
        assert!((e.rate() - 1.0 / 180.0).abs() < 1e-15);
        assert!((e.median() - 124.76649250079015).abs() < 1e-9);
    }

    #[test]
    fn test_exponential_invalid() {
        assert!(Exponential::new(0.0).is_err());
        assert!(Exponential::new(-1.0).is_err());
        assert!(Exponential::new(f64::NAN).is_err());
        assert!(Exponential::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_exponential_cdf() {
        let e = Exponential::new(2.0).unwrap();
        assert_eq!(e.cdf(-1.0), 0.0);
        assert_eq!(e.cdf(0.0), 0.0);
        assert!((e.cdf(2.0) - (1.0 - (-1.0_f64).exp())).abs() < 1e-15);
    }

    #[test]
    fn test_exponential_pdf() {
        let e = Exponential::new(2.0).unwrap();
        assert_eq!(e.pdf(-0.5), 0.0);
        assert!((e.pdf(0.0) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_exponential_quantile() {
        let e = Exponential::new(3.0).unwrap();
        assert_eq!(e.quantile(0.0), Some(0.0));
        assert_eq!(e.quantile(1.0), None);
        assert_eq!(e.quantile(-0.1), None);
        let q = e.quantile(0.5).unwrap();
        assert!((q - e.median()).abs() < 1e-12);
    }

    #[test]
    fn test_exponential_sample_is_inverse_transform() {
        let e = Exponential::new(5.0).unwrap();
        let mut rng_a = create_rng(9);
        let mut rng_b = create_rng(9);
        for _ in 0..100 {
            let u = uniform01(&mut rng_b);
            let expected = -5.0 * (1.0 - u).ln();
            assert_eq!(e.sample(&mut rng_a), expected);
        }
    }

    #[test]
    fn test_exponential_fill_converges() {
        let e = Exponential::new(3.0).unwrap();
        let mut rng = create_rng(42);
        let mut buf = vec![0.0; 100_000];
        e.fill(&mut buf, &mut rng);
        assert!(buf.iter().all(|&x| x >= 0.0 && x.is_finite()));
        let m = mean(&buf).unwrap();
        assert!((m - 3.0).abs() < 0.05, "mean {m}");
    }

    // --- Cholesky ---

    #[test]
    fn test_cholesky_reconstructs() {
        let a = vec![vec![4.0, 2.0], vec![2.0, 3.0]];
        let l = cholesky(&a).unwrap();
        assert_eq!(l[0][1], 0.0);
        for i in 0..2 {
            for j in 0..2 {
                let v: f64 = (0..2).map(|k| l[i][k] * l[j][k]).sum();
                assert!((v - a[i][j]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_cholesky_rejects_indefinite() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 1.0]];
        assert!(cholesky(&a).is_err());
    }

    #[test]
    fn test_cholesky_rejects_non_square() {
        let ragged = vec![vec![4.0, 1.0], vec![1.0]];
        assert!(matches!(
            cholesky(&ragged),
            Err(DistributionError::InvalidParameters(_))
        ));
        let wide = vec![vec![4.0, 1.0, 0.0], vec![1.0, 3.0, 0.0]];
        assert!(cholesky(&wide).is_err());
        assert_eq!(cholesky(&[]).unwrap(), Vec::<Vec<f64>>::new());
    }

    // --- CorrelatedLogNormal ---

    fn coursework_model() -> CorrelatedLogNormal {
        let cov = 0.2 * 0.25 * 0.85;
        CorrelatedLogNormal::new(
            vec![4.15, 2.39],
            vec![vec![0.2 * 0.2, cov], vec![cov, 0.25 * 0.25]],
        )
        .unwrap()
    }

    #[test]
    fn test_lognormal_invalid() {
        assert!(CorrelatedLogNormal::new(vec![], vec![]).is_err());
        assert!(CorrelatedLogNormal::new(vec![0.0, 0.0], vec![vec![1.0]]).is_err());
        assert!(
            CorrelatedLogNormal::new(vec![0.0, 0.0], vec![vec![1.0, 0.5], vec![0.4, 1.0]])
                .is_err()
        );
        assert!(CorrelatedLogNormal::new(vec![f64::NAN], vec![vec![1.0]]).is_err());
    }

    #[test]
    fn test_lognormal_marginal_moments() {
        let d = CorrelatedLogNormal::new(vec![0.0], vec![vec![1.0]]).unwrap();
        assert!((d.marginal_mean(0).unwrap() - 0.5_f64.exp()).abs() < 1e-12);
        let expected_var = (1.0_f64.exp() - 1.0) * 1.0_f64.exp();
        assert!((d.marginal_variance(0).unwrap() - expected_var).abs() < 1e-12);
        assert_eq!(d.marginal_mean(1), None);
    }

    #[test]
    fn test_lognormal_log_space_means() {
        let d = coursework_model();
        assert_eq!(d.dim(), 2);
        let mut rng = create_rng(42);
        let mut acc = [RunningStats::new(), RunningStats::new()];
        for _ in 0..50_000 {
            let s = d.sample(&mut rng);
            assert!(s.iter().all(|&x| x > 0.0));
            for (a, x) in acc.iter_mut().zip(&s) {
                a.push(x.ln());
            }
        }
        assert!((acc[0].mean().unwrap() - 4.15).abs() < 0.01);
        assert!((acc[1].mean().unwrap() - 2.39).abs() < 0.01);
        assert!((acc[0].std_dev().unwrap() - 0.2).abs() < 0.01);
        assert!((acc[1].std_dev().unwrap() - 0.25).abs() < 0.01);
    }

    #[test]
    fn test_lognormal_correlation() {
        let d = coursework_model();
        let mut rng = create_rng(7);
        let n = 50_000;
        let (mut xs, mut ys) = (Vec::with_capacity(n), Vec::with_capacity(n));
        for _ in 0..n {
            let s = d.sample(&mut rng);
            xs.push(s[0].ln());
            ys.push(s[1].ln());
        }
        let (mx, my) = (mean(&xs).unwrap(), mean(&ys).unwrap());
        let cov: f64 = xs
            .iter()
            .zip(&ys)
            .map(|(x, y)| (x - mx) * (y - my))
            .sum::<f64>()
            / n as f64;
        let rho = cov / (0.2 * 0.25);
        assert!((rho - 0.85).abs() < 0.02, "correlation {rho}");
    }
}
