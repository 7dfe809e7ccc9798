//! # Logging
//!
//! Sets up `tracing` with a non-blocking file writer under the configured log
//! directory. stdout carries MCP frames, so console output (when enabled)
//! goes to stderr.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::domain::config::ServerConfig;
use crate::domain::paths;
use crate::strings::logs;

const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn,rmcp=info";

/// Installs the global subscriber. Keep the returned guard alive for the life
/// of the process or buffered lines are lost.
pub fn init(config: &ServerConfig, log_stderr: bool) -> Result<WorkerGuard> {
    let log_dir = config.log_root();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("{}: {}", logs::LOG_DIR_ERROR, log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&log_dir, paths::LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    let console_layer = if log_stderr {
        Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter(config.log_level.as_deref()))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

/// `RUST_LOG` wins, then the configured level, then [`DEFAULT_FILTER`].
fn env_filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| match level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        None => EnvFilter::new(DEFAULT_FILTER),
    })
}
