//! # Domain Types
//!
//! Requests and results exchanged between the tool surface and the sandbox.

use serde::Serialize;
use std::path::PathBuf;

use crate::domain::error::ToolError;

/// Actions accepted by the `code_interpreter` entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Read,
    Write,
    Execute,
}

impl Action {
    pub fn parse(action: &str) -> Option<Self> {
        match action.trim().to_ascii_lowercase().as_str() {
            "list" => Some(Self::List),
            "read" => Some(Self::Read),
            "write" => Some(Self::Write),
            "execute" => Some(Self::Execute),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExecutionRequest {
    pub filename: Option<String>,
    pub content: Option<String>,
    pub language: Option<String>,
    /// Per-call timeout in seconds; the configured default applies when absent.
    pub timeout: Option<u64>,
}

/// Arguments of the `browse_web` tool.
#[derive(Debug, Clone, Default)]
pub struct BrowseRequest {
    pub action: String,
    pub url: Option<String>,
    pub script: Option<String>,
    pub scroll_amount: Option<i64>,
}

/// Output of a process that ran to completion.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// A detached process launched with `background = true`. Never tracked after spawn.
#[derive(Debug, Clone)]
pub struct BackgroundProcess {
    pub pid: u32,
    pub log_file: PathBuf,
    pub script_file: PathBuf,
}

#[derive(Debug, Clone)]
pub enum CommandOutput {
    Foreground(ExecOutput),
    Background(BackgroundProcess),
}

/// Terminal state of one tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationOutcome {
    Completed,
    InnerTimedOut,
    OuterTimedOut,
    Rejected,
    Failed,
}

impl InvocationOutcome {
    pub fn of<T>(result: &Result<T, ToolError>) -> Self {
        match result {
            Ok(_) => Self::Completed,
            Err(ToolError::ExecutionTimeout { .. }) => Self::InnerTimedOut,
            Err(ToolError::GlobalTimeout(_)) => Self::OuterTimedOut,
            Err(e) if e.is_rejection() => Self::Rejected,
            Err(_) => Self::Failed,
        }
    }
}

impl std::fmt::Display for InvocationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Completed => "completed",
            Self::InnerTimedOut => "inner_timed_out",
            Self::OuterTimedOut => "outer_timed_out",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
