//! Environment variable access.
//!
//! Credential and config-path lookups go through [`Env`] so tests can
//! supply controlled values without touching the process environment
//! (no `unsafe` `std::env::set_var` in tests).

use std::collections::HashMap;

/// Environment variable reader: the real process environment, or a
/// fixed map for tests.
#[derive(Clone, Debug, Default)]
pub enum Env {
    /// Read from the process environment.
    #[default]
    Real,
    /// Read from a fixed set of key-value pairs.
    Mock(HashMap<String, String>),
}

impl Env {
    /// Create an `Env` that reads from the real process environment.
    pub fn real() -> Self {
        Env::Real
    }

    /// Create an `Env` backed by explicit key-value pairs.
    pub fn mock(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Env::Mock(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Look up an environment variable by name.
    pub fn var(&self, name: &str) -> Result<String, std::env::VarError> {
        match self {
            Env::Real => std::env::var(name),
            Env::Mock(map) => map
                .get(name)
                .cloned()
                .ok_or(std::env::VarError::NotPresent),
        }
    }

    /// Returns `true` if the variable is present.
    pub fn is_set(&self, name: &str) -> bool {
        self.var(name).is_ok()
    }
}
