//! # Interface Layer
//!
//! The MCP tool surface: argument schemas and the stdio server.

pub mod params;
pub mod server;

pub use server::ManusServer;
