//! Configuration loading.
//!
//! Handles YAML config resolution (explicit path, environment variable,
//! local file, global file) and credential overrides from the
//! environment.

pub mod loader;

pub use loader::{Config, ConfigError, GerritConfig, ModelConfig, ReviewTypeConfig};
