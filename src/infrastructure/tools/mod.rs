//! # Tools Module
//!
//! Sandboxed tool execution: file access, interpreters and shell commands.
//! Every filesystem path is confined by [`crate::infrastructure::sandbox::Sandbox`].

pub mod command;
pub mod files;
pub mod interpreter;
pub mod process;

pub use command::{CommandMode, CommandRunner};
pub use files::FileStore;
pub use interpreter::{InterpreterDispatcher, Source};
