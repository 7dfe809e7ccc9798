//! # Domain Layer
//!
//! Core definitions, types, and errors that describe the sandboxed tool surface.
//! Independent of the transport, serving as the contract for the other layers.

pub mod config;
pub mod error;
pub mod interpreters;
pub mod paths;
pub mod types;
