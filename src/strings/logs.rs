use crate::domain::types::InvocationOutcome;

pub const SERVER_START: &str = "Starting Manus MCP server on stdio...";
pub const SERVER_STOPPED: &str = "MCP client disconnected, shutting down";
pub const CONFIG_READ_ERROR: &str = "Failed to read configuration";
pub const LOG_DIR_ERROR: &str = "Failed to create log directory";
pub const SANDBOX_CREATE_ERROR: &str = "Failed to create sandbox directory";

pub fn sandbox_ready(root: &str) -> String {
    format!("Using sandbox directory: {root}")
}

pub fn timeouts(global: u64, command: u64, execute: u64) -> String {
    format!("Timeouts: global {global}s, command {command}s, execute {execute}s")
}

pub fn tool_start(tool: &str, detail: &str) -> String {
    if detail.is_empty() {
        format!("Tool '{tool}' invoked")
    } else {
        format!("Tool '{tool}' invoked: {}", preview(detail))
    }
}

pub fn tool_finished(tool: &str, outcome: InvocationOutcome) -> String {
    format!("Tool '{tool}' finished: {outcome}")
}

pub fn tool_failed(tool: &str, outcome: InvocationOutcome, err: &str) -> String {
    format!("Tool '{tool}' finished: {outcome} ({err})")
}

pub fn search_failed(query: &str, err: &str) -> String {
    format!("Search for {:?} failed: {err}", preview(query))
}

pub fn browser_action_failed(action: &str, err: &str) -> String {
    format!("Browser action '{action}' failed: {err}")
}

/// First 100 characters of a (possibly long) argument.
pub fn preview(text: &str) -> String {
    const LIMIT: usize = 100;
    let single_line = text.replace('\n', "\\n");
    match single_line.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &single_line[..cut]),
        None => single_line,
    }
}
