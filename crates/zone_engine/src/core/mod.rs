//! # Core Engine Module
//!
//! Shared abstractions used across the engine's subsystems.
//!
//! ## Organization
//!
//! - **Config**: Zone configuration loaded from TOML or RON files

pub mod config;

// Re-export commonly used config types
pub use config::{Config, ConfigError, ZoneSettings};
