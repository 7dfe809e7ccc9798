//! # Main Entry Point
//!
//! Starts the Manus MCP server:
//! - Domain: configuration, types, errors, interpreter table
//! - Infrastructure: sandbox, file/process tools, web collaborators
//! - Application: global timeout guard, toolbox, logging
//! - Interface: MCP tool server over stdio
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use rmcp::ServiceExt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::Toolbox;
use crate::domain::config::ServerConfig;
use crate::infrastructure::sandbox::Sandbox;
use crate::interface::ManusServer;
use crate::strings::logs;

#[derive(Parser, Debug)]
#[command(name = "manus-mcp", version, about = "Sandboxed file, code and shell tools over MCP")]
struct Cli {
    /// YAML configuration file (default: data/config.yaml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory all file and process tools are confined to
    #[arg(long)]
    sandbox_dir: Option<String>,

    /// Ceiling for every tool call, in seconds
    #[arg(long)]
    global_timeout: Option<u64>,

    /// Also write logs to stderr
    #[arg(long)]
    log_stderr: bool,
}

impl Cli {
    /// Defaults, then YAML, then environment, then these flags.
    fn load_config(&self) -> Result<ServerConfig> {
        let mut config = ServerConfig::load(self.config.as_deref()).context(logs::CONFIG_READ_ERROR)?;
        config.apply_env(|key| std::env::var(key).ok())?;

        if let Some(dir) = &self.sandbox_dir {
            config.sandbox_dir = dir.clone();
        }
        if let Some(secs) = self.global_timeout {
            config.global_timeout = secs;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    // 1. Configuration
    let config = cli.load_config()?;

    // 2. Logging (stdout is reserved for MCP frames)
    let _log_guard = application::logging::init(&config, cli.log_stderr)?;
    tracing::info!("{}", logs::SERVER_START);

    // 3. Sandbox
    let sandbox = Sandbox::create(config.sandbox_root())
        .with_context(|| format!("{}: {}", logs::SANDBOX_CREATE_ERROR, config.sandbox_dir))?;
    tracing::info!("{}", logs::sandbox_ready(&sandbox.root().display().to_string()));
    tracing::info!(
        "{}",
        logs::timeouts(config.global_timeout, config.command_timeout, config.execute_timeout)
    );

    // 4. Serve until the client disconnects
    let toolbox = Arc::new(Toolbox::new(Arc::new(sandbox), &config));
    let service = ManusServer::new(toolbox)
        .serve(rmcp::transport::stdio())
        .await
        .inspect_err(|e| tracing::error!("Failed to start MCP server: {}", e))?;
    service.waiting().await?;

    tracing::info!("{}", logs::SERVER_STOPPED);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "manus-mcp",
            "--config",
            "/nonexistent/manus.yaml",
            "--sandbox-dir",
            "/tmp/box",
            "--global-timeout",
            "5",
            "--log-stderr",
        ]);
        assert_eq!(cli.sandbox_dir.as_deref(), Some("/tmp/box"));
        assert_eq!(cli.global_timeout, Some(5));
        assert!(cli.log_stderr);
        // An explicit config path must exist.
        assert!(cli.load_config().is_err());
    }
}
