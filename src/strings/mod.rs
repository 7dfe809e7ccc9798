//! # Strings Module
//!
//! Centralizes tool responses, log lines and agent-facing prompts.

pub mod logs;
pub mod messages;
pub mod prompts;
