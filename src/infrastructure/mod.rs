//! # Infrastructure Layer
//!
//! Everything that touches the OS or the network: path confinement, file and
//! process tools, and the web collaborators.

pub mod sandbox;
pub mod tools;
pub mod web;
