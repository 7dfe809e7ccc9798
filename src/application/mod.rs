//! # Application Layer
//!
//! Orchestrates tool invocations: the global timeout guard, the toolbox that
//! turns every call into a response string, and logging bootstrap.

pub mod logging;
pub mod timeout;
pub mod toolbox;

pub use toolbox::Toolbox;
