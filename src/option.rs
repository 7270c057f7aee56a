//! Option on the largest of several powered log-normal assets.
//!
//! The option pays, in one year, the positive part of
//! `maxᵢ(Sᵢ^αᵢ) − K`, where `S` is a vector of correlated log-normal
//! prices and `α` a vector of exponents. Simulation returns the raw excess
//! `maxᵢ(Sᵢ^αᵢ) − K` (which is negative when the option expires out of the
//! money); [`OptionModel::payoffs`] floors it at zero.

use rand::Rng;

use crate::distributions::CorrelatedLogNormal;
use crate::error::{Result, SimError};
use crate::stats::mean;

/// Max-of-powered-assets option model.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionModel {
    assets: CorrelatedLogNormal,
    alpha: Vec<f64>,
    strike: f64,
}

impl OptionModel {
    /// Builds the model from log-space means `mu`, log-space covariance,
    /// exponents `alpha` and strike `strike`.
    ///
    /// # Errors
    /// Returns an error if the asset distribution is invalid, `alpha` does
    /// not have one entry per asset, or any `alpha`/`strike` is not finite.
    pub fn new(
        mu: Vec<f64>,
        covariance: Vec<Vec<f64>>,
        alpha: Vec<f64>,
        strike: f64,
    ) -> Result<Self> {
        let assets = CorrelatedLogNormal::new(mu, covariance)?;
        if alpha.len() != assets.dim() {
            return Err(SimError::invalid(format!(
                "expected {} exponents, got {}",
                assets.dim(),
                alpha.len()
            )));
        }
        if !alpha.iter().all(|a| a.is_finite()) || !strike.is_finite() {
            return Err(SimError::invalid("exponents and strike must be finite"));
        }
        Ok(Self {
            assets,
            alpha,
            strike,
        })
    }

    pub fn assets(&self) -> &CorrelatedLogNormal {
        &self.assets
    }

    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// `maxᵢ(Sᵢ^αᵢ) − K` for one price vector.
    pub fn excess(&self, prices: &[f64]) -> f64 {
        prices
            .iter()
            .zip(&self.alpha)
            .map(|(s, a)| s.powf(*a))
            .fold(f64::NEG_INFINITY, f64::max)
            - self.strike
    }

    /// `size` independent draws of the unfloored excess.
    pub fn sample<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<f64> {
        (0..size)
            .map(|_| self.excess(&self.assets.sample(rng)))
            .collect()
    }

    /// `size` independent payoffs, `max(excess, 0)`.
    pub fn payoffs<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<f64> {
        self.sample(size, rng)
            .into_iter()
            .map(|x| x.max(0.0))
            .collect()
    }

    /// Monte-Carlo price: mean payoff over `size` draws (undiscounted).
    ///
    /// # Errors
    /// Returns [`SimError::InvalidArgument`] if `size` is zero.
    pub fn price<R: Rng>(&self, size: usize, rng: &mut R) -> Result<f64> {
        if size == 0 {
            return Err(SimError::invalid("price needs at least one draw"));
        }
        mean(&self.payoffs(size, rng))
            .ok_or_else(|| SimError::invalid("payoffs overflowed to a non-finite value"))
    }
}
