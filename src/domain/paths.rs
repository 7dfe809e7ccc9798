//! # Sandbox Paths
//!
//! Centralized definitions for default locations and the names of files the
//! server generates inside the sandbox (background logs, launch scripts, temp files).

use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "data/config.yaml";
pub const DEFAULT_SANDBOX_DIR: &str = "~/manus-sandbox";
pub const DEFAULT_LOG_DIR: &str = "~/manus-mcp-logs";
pub const LOG_FILE: &str = "manus-mcp.log";

pub const BACKGROUND_LOG_PREFIX: &str = "bg_process_";
pub const BACKGROUND_SCRIPT_PREFIX: &str = "run_bg_";
pub const EXEC_TEMP_PREFIX: &str = "exec_";

/// Returns a token unique enough to name generated files: a timestamp plus
/// a short random suffix, e.g. `20260101T120000123_1a2b3c4d`.
pub fn unique_token() -> String {
    let stamp = chrono::Local::now().format("%Y%m%dT%H%M%S%3f");
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", stamp, &random[..8])
}

/// Log file name for a background launch (e.g. "bg_process_<token>.log")
pub fn background_log_name(token: &str) -> String {
    format!("{}{}.log", BACKGROUND_LOG_PREFIX, token)
}

/// Launch script name for a background launch (e.g. "run_bg_<token>.sh")
pub fn background_script_name(token: &str) -> String {
    format!("{}{}.sh", BACKGROUND_SCRIPT_PREFIX, token)
}

/// Expands a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
