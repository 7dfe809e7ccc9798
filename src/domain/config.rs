//! # Configuration
//!
//! Loads the server configuration: built-in defaults, then an optional YAML file
//! (`data/config.yaml`), then environment variables. CLI flags are applied last
//! by `main`.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::paths;

/// Main server configuration.
/// Matches the layout of `data/config.yaml`; every key is optional.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_sandbox_dir")]
    pub sandbox_dir: String,
    /// Ceiling for every tool invocation, in seconds.
    #[serde(default = "default_global_timeout")]
    pub global_timeout: u64,
    /// Default foreground `run_command` timeout, in seconds.
    #[serde(default = "default_command_timeout")]
    pub command_timeout: u64,
    /// Default interpreter `execute` timeout, in seconds.
    #[serde(default = "default_execute_timeout")]
    pub execute_timeout: u64,
    #[serde(default = "default_search_max_results")]
    pub search_max_results: usize,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_sandbox_dir() -> String {
    paths::DEFAULT_SANDBOX_DIR.to_string()
}
fn default_global_timeout() -> u64 {
    60
}
fn default_command_timeout() -> u64 {
    30
}
fn default_execute_timeout() -> u64 {
    10
}
fn default_search_max_results() -> usize {
    10
}
fn default_log_dir() -> String {
    paths::DEFAULT_LOG_DIR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            sandbox_dir: default_sandbox_dir(),
            global_timeout: default_global_timeout(),
            command_timeout: default_command_timeout(),
            execute_timeout: default_execute_timeout(),
            search_max_results: default_search_max_results(),
            log_dir: default_log_dir(),
            log_level: None,
        }
    }
}

impl ServerConfig {
    /// Reads the YAML file at `path`, or `data/config.yaml` if it exists.
    /// An explicitly requested file must exist; the implicit one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(paths::DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if required {
                bail!("Config file not found: {}", path.display());
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Overlays environment variables. `lookup` is `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("SANDBOX_DIR") {
            self.sandbox_dir = dir;
        }
        if let Some(value) = lookup("GLOBAL_TIMEOUT") {
            self.global_timeout = parse_env("GLOBAL_TIMEOUT", &value)?;
        }
        if let Some(value) = lookup("COMMAND_TIMEOUT") {
            self.command_timeout = parse_env("COMMAND_TIMEOUT", &value)?;
        }
        if let Some(value) = lookup("EXECUTE_TIMEOUT") {
            self.execute_timeout = parse_env("EXECUTE_TIMEOUT", &value)?;
        }
        if let Some(value) = lookup("GOOGLE_SEARCH_MAX_RESULTS") {
            self.search_max_results = parse_env("GOOGLE_SEARCH_MAX_RESULTS", &value)?;
        }
        if let Some(dir) = lookup("LOG_DIR") {
            self.log_dir = dir;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = Some(level);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.sandbox_dir.trim().is_empty() {
            bail!("sandbox_dir must not be empty");
        }
        for (name, value) in [
            ("global_timeout", self.global_timeout),
            ("command_timeout", self.command_timeout),
            ("execute_timeout", self.execute_timeout),
        ] {
            if value == 0 {
                bail!("{name} must be at least 1 second");
            }
        }
        Ok(())
    }

    pub fn sandbox_root(&self) -> PathBuf {
        paths::expand_home(&self.sandbox_dir)
    }

    pub fn log_root(&self) -> PathBuf {
        paths::expand_home(&self.log_dir)
    }

    pub fn global_timeout(&self) -> Duration {
        Duration::from_secs(self.global_timeout)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {name}: {value:?}"))
}
