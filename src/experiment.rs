//! Experiment runner: simulate, summarize, and collect report rows.
//!
//! An [`ExperimentConfig`] lists production-line and option scenarios and
//! the trial counts to run each with. [`run_experiments`] produces one
//! [`Report`] per (scenario, trial count) pair, ready for
//! [`render`](crate::report::render).
//!
//! A configuration that fails (for example a non-positive mean) does not
//! stop the run: it is logged and recorded as a row whose `status` column
//! carries the error, and the next configuration proceeds.

use std::path::Path;
use std::time::Instant;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::error::{Result, SimError};
use crate::option::OptionModel;
use crate::random::rng_from_seed;
use crate::report::Report;
use crate::sampler::{ProductionLine, DEFAULT_STATIONS};
use crate::stats::{summarize, Summary};

/// Column holding the error message of a skipped configuration.
pub const STATUS_COLUMN: &str = "status";

/// Top-level experiment configuration.
///
/// Missing fields take the [`Default`] values, which reproduce the
/// coursework setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Generator seed; `None` seeds from the operating system.
    pub seed: Option<u64>,
    /// Number of trials per scenario, one report row each.
    pub trials: Vec<usize>,
    /// Probability of the lower reported quantile.
    pub lower_quantile: f64,
    /// Probability of the upper reported quantile.
    pub upper_quantile: f64,
    pub production: Vec<ProductionScenario>,
    pub options: Vec<OptionScenario>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            seed: None,
            trials: vec![100, 1_000, 10_000],
            lower_quantile: 0.05,
            upper_quantile: 0.95,
            production: vec![ProductionScenario::default()],
            options: vec![OptionScenario::default()],
        }
    }
}

impl ExperimentConfig {
    /// Parses a JSON configuration.
    ///
    /// # Errors
    /// Returns [`SimError::Config`] on malformed JSON or invalid quantiles.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    /// Returns [`SimError::Config`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Checks settings shared by every scenario.
    ///
    /// Per-scenario parameters are checked when the scenario runs, so one
    /// bad scenario does not reject the whole configuration.
    ///
    /// # Errors
    /// Returns [`SimError::Config`] if a quantile probability is outside
    /// `[0, 1]` or the lower one exceeds the upper one.
    pub fn validate(&self) -> Result<()> {
        let (lo, hi) = (self.lower_quantile, self.upper_quantile);
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo > hi {
            return Err(SimError::Config(format!(
                "quantiles must satisfy 0 <= lower <= upper <= 1, got {lo} and {hi}"
            )));
        }
        Ok(())
    }
}

/// One assembly-line setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionScenario {
    /// Production time budget per run.
    pub prod_time: f64,
    /// Mean time at each workstation.
    pub mean: f64,
    /// Mean repair time; 0 disables breakdowns.
    pub repair_mean: f64,
    pub stations: usize,
}

impl Default for ProductionScenario {
    fn default() -> Self {
        Self {
            prod_time: 8.0 * 60.0,
            mean: 3.0,
            repair_mean: 3.0 * 60.0,
            stations: DEFAULT_STATIONS,
        }
    }
}

/// One option-pricing setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionScenario {
    /// Log-space means of the assets.
    pub mu: Vec<f64>,
    /// Log-space covariance matrix.
    pub covariance: Vec<Vec<f64>>,
    pub alpha: Vec<f64>,
    pub strike: f64,
}

impl Default for OptionScenario {
    fn default() -> Self {
        let c = 0.2 * 0.25 * 0.85;
        Self {
            mu: vec![4.15, 2.39],
            covariance: vec![vec![0.2 * 0.2, c], vec![c, 0.25 * 0.25]],
            alpha: vec![1.0, 1.0],
            strike: 682.0,
        }
    }
}

/// Runs every configured scenario with every trial count.
///
/// Rows come out production scenarios first, then option scenarios, each
/// in configuration order with trial counts innermost.
pub fn run_experiments(config: &ExperimentConfig) -> Vec<Report> {
    let mut rng = rng_from_seed(config.seed);
    run_experiments_with(config, &mut rng)
}

/// [`run_experiments`] with a caller-supplied generator.
pub fn run_experiments_with<R: Rng>(config: &ExperimentConfig, rng: &mut R) -> Vec<Report> {
    let quantiles = (config.lower_quantile, config.upper_quantile);
    let mut reports = Vec::new();

    for scenario in &config.production {
        let _span = info_span!("production", prod_time = scenario.prod_time, mean = scenario.mean)
            .entered();
        for &trials in &config.trials {
            let row = run_production(scenario, trials, quantiles, rng)
                .unwrap_or_else(|err| failed_row(production_fields(scenario, trials), &err));
            reports.push(row);
        }
    }

    for scenario in &config.options {
        let _span = info_span!("option", strike = scenario.strike).entered();
        for &trials in &config.trials {
            let row = run_option(scenario, trials, quantiles, rng)
                .unwrap_or_else(|err| failed_row(option_fields(scenario, trials), &err));
            reports.push(row);
        }
    }

    info!(rows = reports.len(), "experiments finished");
    reports
}

/// Simulates `trials` production runs and summarizes them.
///
/// # Errors
/// Returns [`SimError::InvalidArgument`] for invalid scenario parameters,
/// zero trials, or quantile probabilities outside `[0, 1]`.
pub fn run_production<R: Rng>(
    scenario: &ProductionScenario,
    trials: usize,
    (lower, upper): (f64, f64),
    rng: &mut R,
) -> Result<Report> {
    let started = Instant::now();
    let line = ProductionLine::new(scenario.mean, scenario.stations, scenario.repair_mean)?;
    let sample = line.sample(trials, scenario.prod_time, rng)?;
    let summary = summarize(&sample, lower, upper)?;
    let elapsed = started.elapsed().as_secs_f64();
    debug!(trials, mean = summary.mean, variance = summary.variance, elapsed, "production run");

    let mut report = production_fields(scenario, trials);
    report.insert("time taken (s)", elapsed);
    report.insert("expected mean", line.expected_production(scenario.prod_time));
    report.insert(
        "expected variance",
        line.expected_production_variance(scenario.prod_time),
    );
    push_summary(&mut report, &summary, lower, upper);
    Ok(report)
}

/// Simulates `trials` option excesses and summarizes them.
///
/// # Errors
/// Returns an error for an invalid model, zero trials, or quantile
/// probabilities outside `[0, 1]`.
pub fn run_option<R: Rng>(
    scenario: &OptionScenario,
    trials: usize,
    (lower, upper): (f64, f64),
    rng: &mut R,
) -> Result<Report> {
    let started = Instant::now();
    let model = OptionModel::new(
        scenario.mu.clone(),
        scenario.covariance.clone(),
        scenario.alpha.clone(),
        scenario.strike,
    )?;
    let sample = model.sample(trials, rng);
    let summary = summarize(&sample, lower, upper)?;
    let elapsed = started.elapsed().as_secs_f64();
    debug!(trials, mean = summary.mean, variance = summary.variance, elapsed, "option run");

    let mut report = option_fields(scenario, trials);
    report.insert("time taken (s)", elapsed);
    report.insert("expected mean", "unknown");
    report.insert("expected variance", "unknown");
    push_summary(&mut report, &summary, lower, upper);
    Ok(report)
}

fn production_fields(scenario: &ProductionScenario, trials: usize) -> Report {
    Report::new()
        .with("model", "assembly line")
        .with("production time", scenario.prod_time)
        .with("number of trials", trials)
}

fn option_fields(scenario: &OptionScenario, trials: usize) -> Report {
    Report::new()
        .with("model", "option")
        .with("strike", scenario.strike)
        .with("number of trials", trials)
}

fn push_summary(report: &mut Report, summary: &Summary, lower: f64, upper: f64) {
    report.insert("sample mean", summary.mean);
    report.insert("sample variance", summary.variance);
    match summary.variation {
        Some(cv) => report.insert("coefficient of variation", cv),
        None => report.insert("coefficient of variation", "undefined"),
    }
    report.insert(percentile_label(lower), summary.lower_quantile);
    report.insert(percentile_label(upper), summary.upper_quantile);
}

fn failed_row(mut report: Report, err: &SimError) -> Report {
    warn!(error = %err, "configuration skipped");
    report.insert(STATUS_COLUMN, format!("error: {err}"));
    report
}

/// Column title for quantile `p`, e.g. `"5% percentile"` for 0.05.
pub fn percentile_label(p: f64) -> String {
    let pct = (p * 1e4).round() / 1e2;
    format!("{pct}% percentile")
}
