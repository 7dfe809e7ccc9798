//! Errors raised by the sandboxed tools.
//!
//! Every variant is converted to the `Error: <message>` string contract at the
//! toolbox boundary, so the display text is what callers see.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    /// Missing or malformed arguments, unsupported language, denylisted command.
    #[error("{0}")]
    Validation(String),

    /// The requested path resolves outside the sandbox root.
    #[error("File path {0} attempts to escape the sandbox")]
    PathEscape(String),

    #[error("File '{0}' does not exist")]
    NotFound(String),

    #[error("File '{0}' appears to be a binary file and cannot be read as text")]
    NotText(String),

    /// Per-call timeout expired and the process was killed.
    #[error("{subject} timed out after {secs} seconds")]
    ExecutionTimeout { subject: &'static str, secs: u64 },

    /// The outer ceiling expired; always dominant over `ExecutionTimeout`.
    #[error("Operation timed out after {0} seconds (global timeout)")]
    GlobalTimeout(u64),

    /// Spawn or communicate failure at the OS level.
    #[error("{0}")]
    Process(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ToolError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// True for failures reported before any process is spawned or file touched.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::PathEscape(_) | Self::NotFound(_) | Self::NotText(_)
        )
    }
}
