//! App-wide constants.
//!
//! Centralises the tool name, config paths, and environment variable
//! names so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "gerry";

/// Local config filename looked up in the current directory.
pub const CONFIG_FILENAME: &str = "gerry.yaml";

/// Directory name under `~/.config/` for the global config file.
pub const CONFIG_DIR: &str = "gerry";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_CONFIG: &str = "GERRY_CONFIG";
pub const ENV_GERRIT_USERNAME: &str = "GERRY_GERRIT_USERNAME";
pub const ENV_GERRIT_PASSWORD: &str = "GERRY_GERRIT_PASSWORD";
