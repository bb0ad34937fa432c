//! Tracing subscriber setup.
//!
//! Human-readable lines on stdout by default, JSON lines with `--json`.
//! `--log-file` additionally appends every line to a file. `RUST_LOG`
//! overrides `--log-level`.

use crate::error::{CliError, CliResult};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `info` or
    /// `info,stocksync_engine=debug`.
    pub level: String,
    pub json: bool,
    pub file: Option<PathBuf>,
}

fn build_filter(level: &str) -> CliResult<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| CliError::Logging(format!("invalid log filter '{level}': {e}")))
}

/// Install the global subscriber.
pub fn init_logging(options: &LogOptions) -> CliResult<()> {
    let filter = build_filter(&options.level)?;

    let log_file = options
        .file
        .as_ref()
        .map(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map(Arc::new)
                .map_err(|e| CliError::Logging(format!("cannot open {}: {e}", path.display())))
        })
        .transpose()?;

    let stdout_text = (!options.json).then(|| fmt::layer().with_target(false));
    let stdout_json = options
        .json
        .then(|| fmt::layer().json().with_target(true).flatten_event(true));

    let file_text = log_file
        .clone()
        .filter(|_| !options.json)
        .map(|file| fmt::layer().with_ansi(false).with_writer(file));
    let file_json = log_file
        .filter(|_| options.json)
        .map(|file| fmt::layer().json().flatten_event(true).with_writer(file));

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_text)
        .with(stdout_json)
        .with(file_text)
        .with(file_json)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))?;

    tracing::debug!(level = %options.level, json = options.json, "Logging initialized");
    Ok(())
}
