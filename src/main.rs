//! Runs the configured experiments and prints the results as a Markdown table.
//!
//! `SIMSTATS_CONFIG` names a JSON configuration file; without it the
//! built-in defaults run. `SIMSTATS_LOG` sets the log filter (default `info`).
//! Logs go to stderr so the table on stdout stays clean.

use std::io;

use anyhow::Context;
use simstats::experiment::{run_experiments, ExperimentConfig};
use simstats::report::render_to;
use tracing::info;
use tracing_subscriber::EnvFilter;

const CONFIG_VAR: &str = "SIMSTATS_CONFIG";
const LOG_VAR: &str = "SIMSTATS_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn load_config() -> anyhow::Result<ExperimentConfig> {
    match std::env::var_os(CONFIG_VAR) {
        Some(path) => {
            info!(path = %path.to_string_lossy(), "loading configuration");
            ExperimentConfig::from_path(&path)
                .with_context(|| format!("loading {CONFIG_VAR}={}", path.to_string_lossy()))
        }
        None => Ok(ExperimentConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = load_config()?;
    let reports = run_experiments(&config);
    let stdout = io::stdout();
    render_to(&mut stdout.lock(), &reports, None).context("writing report table")?;
    Ok(())
}
