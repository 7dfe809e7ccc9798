use std::fmt::Display;

pub const FILENAME_REQUIRED_READ: &str = "Filename is required for 'read' action";
pub const FILENAME_CONTENT_REQUIRED_WRITE: &str = "Filename and content are required for 'write' action";
pub const EXECUTE_ARGS_REQUIRED: &str =
    "Either filename or content, and language are required for 'execute' action";
pub const TIMEOUT_TOO_SMALL: &str = "Timeout must be at least 1 second";
pub const TIMEOUT_NOT_A_NUMBER: &str = "Timeout must be a whole number of seconds";
pub const NUM_RESULTS_INVALID: &str = "num_results must be a non-negative integer";
pub const SCROLL_AMOUNT_INVALID: &str = "Scroll amount must be an integer number of pixels";
pub const BACKGROUND_INVALID: &str = "background must be true or false";
pub const QUERY_REQUIRED: &str = "Query is required";
pub const BACKGROUND_STATUS: &str = "background_process_started";
pub const BROWSER_ACTIONS: &str = "navigate, get_content, fetch, execute_js, scroll";

/// The uniform failure contract: every tool error reaches the caller as this string.
pub fn error(err: impl Display) -> String {
    format!("Error: {err}")
}

pub fn hello(name: &str) -> String {
    format!("Hello, {name}! Welcome to Manus MCP.")
}

pub fn write_success(bytes: usize, filename: &str) -> String {
    format!("Successfully wrote {bytes} bytes to {filename}")
}

pub fn unknown_action(action: &str) -> String {
    format!("Unknown action '{action}'")
}

pub fn background_started(pid: u32, log_file: &str) -> String {
    format!("Process started in background with PID {pid}. Output is being logged to {log_file}")
}

pub fn search_error(err: impl Display) -> String {
    format!("Error performing search: {err}")
}

pub fn browser_argument_required(argument: &str, action: &str) -> String {
    format!("{argument} is required for '{action}' action")
}

pub fn unknown_browser_action(action: &str) -> String {
    format!("Unknown action '{action}'. Available actions: {BROWSER_ACTIONS}")
}

pub fn navigated(url: &str) -> String {
    format!("Successfully navigated to {url}")
}

pub fn navigate_failed(url: &str, err: impl Display) -> String {
    format!("Failed to navigate to {url}: {err}")
}

pub fn content_failed(err: impl Display) -> String {
    format!("Failed to get page content: {err}")
}

pub fn fetch_failed(err: impl Display) -> String {
    format!("Failed to fetch webpage: {err}")
}

pub fn js_result(value: &str) -> String {
    format!("JavaScript execution result: {value}")
}

pub fn scrolled(pixels: i64) -> String {
    let direction = if pixels > 0 { "down" } else { "up" };
    format!("Scrolled {direction} by {} pixels", pixels.unsigned_abs())
}

pub fn browser_action_error(err: impl Display) -> String {
    format!("Error performing browser action: {err}")
}
