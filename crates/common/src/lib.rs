//! Shared types and utilities for the nsdk workspace.
//!
//! This crate contains the configuration model used by the `nsdk` binary, the
//! naming helpers shared by the analyzer and the generator, and the tracing
//! setup.

pub mod config;
pub mod logging;
pub mod naming;
pub mod paths;

// Re-export commonly used types
pub use config::{Config, ConfigError, MagicType};
pub use logging::init_tracing;
