//! Error types shared by the samplers, estimators and experiment driver.
//!
//! Preconditions that a one-off script would leave undefined (a
//! non-positive mean, an empty sample, a probability outside `[0, 1]`) are
//! checked up front and reported as [`SimError::InvalidArgument`] before
//! any sampling loop starts.

use thiserror::Error;

use crate::distributions::DistributionError;

/// Errors produced by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// An argument violates the documented precondition of an operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A distribution could not be built from the given parameters.
    #[error(transparent)]
    Distribution(#[from] DistributionError),

    /// An experiment configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SimError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SimError::InvalidArgument(msg.into())
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::Config(err.to_string())
    }
}

/// Convenience alias for results carrying a [`SimError`].
pub type Result<T, E = SimError> = std::result::Result<T, E>;
