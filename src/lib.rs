//! # simstats
//!
//! Monte-Carlo simulation helpers and the statistics used to summarize them.
//!
//! The crate simulates a serial assembly line with exponential workstation
//! times and random breakdowns, summarizes the sampled production counts,
//! and renders the results as Markdown tables.
//!
//! ## Modules
//!
//! - [`sampler`]: exponential sampling, assembly-line traversal, production runs
//! - [`stats`]: Welford mean/variance, nearest-rank quantiles, sample summaries
//! - [`report`]: heterogeneous report records and their Markdown rendering
//! - [`distributions`]: exponential and correlated log-normal distributions
//! - [`option`]: max-of-powered-assets option model on correlated log-normal prices
//! - [`experiment`]: JSON-configured experiment runs producing report rows
//! - [`random`]: seeded and entropy-seeded generators
//! - [`error`]: the crate error type
//!
//! ## Example
//!
//! ```
//! use simstats::random::create_rng;
//! use simstats::{mean_variance, produce, quantile};
//!
//! let mut rng = create_rng(7);
//! let runs: Vec<f64> = (0..200)
//!     .map(|_| produce(480.0, 3.0, 180.0, &mut rng).map(|n| n as f64))
//!     .collect::<Result<_, _>>()?;
//! let (mean, _variance) = mean_variance(&runs)?;
//! let p95 = quantile(&runs, 0.95)?;
//! assert!(mean <= p95);
//! # Ok::<(), simstats::SimError>(())
//! ```

pub mod distributions;
pub mod error;
pub mod experiment;
pub mod option;
pub mod random;
pub mod report;
pub mod sampler;
pub mod stats;

pub use error::{Result, SimError};
pub use report::{render, Report, Value};
pub use sampler::{assembly_line_time, exponential_sample, produce, Draws, Shape};
pub use stats::{mean_variance, quantile, RunningStats};
