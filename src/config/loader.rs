//! Config struct and loading logic.
//!
//! Resolution order for the config file (first hit wins):
//! 1. `--config PATH`
//! 2. `GERRY_CONFIG` environment variable
//! 3. `./gerry.yaml`
//! 4. `~/.config/gerry/config.yaml`
//!
//! A missing config file is a fatal error; the tool cannot run without
//! repository and instruction-file paths.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::env::Env;
use crate::models::{BackendName, ModelTier, ReviewType};

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no configuration file found (searched: {})", format_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the git checkout that patches are applied to.
    pub repo_dir: PathBuf,
    pub review: ReviewSettings,
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// Gerrit connection settings. Optional so that local-only reviews
    /// work without them; the `gerrit` subcommand requires the section.
    #[serde(default)]
    pub gerrit: Option<GerritConfig>,
}

/// Review limits and per-type instruction material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSettings {
    /// Token budget for a single review context.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Cap on the number of changed files added to the context.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Directories excluded from file selection (prefix match on
    /// component boundaries).
    #[serde(default)]
    pub ignored_dirs: Vec<String>,
    /// Git pathspec exclude patterns applied when producing the diff
    /// (e.g. generated wire-format test files).
    #[serde(default)]
    pub diff_excludes: Vec<String>,
    pub generic: ReviewTypeConfig,
    pub style: ReviewTypeConfig,
    pub static_analysis: ReviewTypeConfig,
}

fn default_max_tokens() -> usize {
    200_000
}

fn default_max_files() -> usize {
    3
}

impl ReviewSettings {
    /// Instruction material for one review type.
    pub fn for_type(&self, kind: ReviewType) -> &ReviewTypeConfig {
        match kind {
            ReviewType::Generic => &self.generic,
            ReviewType::Style => &self.style,
            ReviewType::StaticAnalysis => &self.static_analysis,
        }
    }
}

/// Instruction and reference material for one review type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewTypeConfig {
    /// File containing the instruction text sent to the assistant.
    pub instruction_file: PathBuf,
    /// Reference documents included ahead of the diff (style guides,
    /// architecture notes). Order is preserved in the prompt.
    #[serde(default)]
    pub reference_files: Vec<PathBuf>,
}

/// Assistant backend and model tier configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub backend: BackendName,
    pub free: Option<ModelConfig>,
    pub paid: Option<ModelConfig>,
}

impl AssistantConfig {
    /// Model configuration for a tier, if configured.
    pub fn tier(&self, tier: ModelTier) -> Option<&ModelConfig> {
        match tier {
            ModelTier::Free => self.free.as_ref(),
            ModelTier::Paid => self.paid.as_ref(),
        }
    }
}

/// One model tier: the model identifier plus its API key source.
#[derive(Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier passed to the assistant (e.g. `gemini/gemini-2.5-pro`).
    pub model: String,
    /// Inline API key. Prefer `api_key_env` for anything checked in.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Name of the environment variable the assistant subprocess reads
    /// its API key from.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_key_env", &self.api_key_env)
            .finish()
    }
}

impl ModelConfig {
    /// Resolve the API key: inline value first, then the configured
    /// environment variable.
    pub fn resolve_api_key(&self, env: &Env) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| env.var(&self.api_key_env).ok())
    }
}

/// Gerrit server connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GerritConfig {
    /// Base URL of the Gerrit instance, without a trailing slash.
    pub url: String,
    /// Project name (e.g. `fs/lustre-release`).
    pub project: String,
    /// Target branch used to resolve full change ids.
    pub branch: String,
    pub auth: GerritAuth,
}

/// HTTP basic auth credentials for the Gerrit REST API.
#[derive(Clone, Serialize, Deserialize)]
pub struct GerritAuth {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for GerritAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GerritAuth")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Config {
    /// Load configuration, resolving the file path and applying
    /// environment overrides.
    pub fn load(explicit: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let path = Self::resolve_path(explicit, env)?;
        let mut config = Self::load_file(&path)?;
        config.apply_env_vars(env);
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a specific file.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_yaml_ng::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Pick the config file path per the documented resolution order.
    fn resolve_path(explicit: Option<&Path>, env: &Env) -> Result<PathBuf, ConfigError> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Ok(path) = env.var(crate::constants::ENV_CONFIG) {
            return Ok(PathBuf::from(path));
        }

        let mut searched = Vec::new();

        let local = PathBuf::from(crate::constants::CONFIG_FILENAME);
        if local.exists() {
            return Ok(local);
        }
        searched.push(local);

        if let Some(global) = Self::global_config_path() {
            if global.exists() {
                return Ok(global);
            }
            searched.push(global);
        }

        Err(ConfigError::NotFound { searched })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(crate::constants::CONFIG_DIR).join("config.yaml"))
    }

    /// Apply environment variable overrides (credentials only).
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(ref mut gerrit) = self.gerrit {
            if let Ok(val) = env.var(crate::constants::ENV_GERRIT_USERNAME) {
                gerrit.auth.username = val;
            }
            if let Ok(val) = env.var(crate::constants::ENV_GERRIT_PASSWORD) {
                gerrit.auth.password = val;
            }
        }
    }

    /// Sanity checks that serde cannot express.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.repo_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("repo_dir must not be empty".into()));
        }
        if self.review.max_tokens == 0 {
            return Err(ConfigError::Invalid(
                "review.max_tokens must be greater than zero".into(),
            ));
        }
        if let Some(ref gerrit) = self.gerrit {
            if gerrit.url.ends_with('/') {
                return Err(ConfigError::Invalid(
                    "gerrit.url must not end with a trailing slash".into(),
                ));
            }
        }
        Ok(())
    }

    /// The Gerrit section, or a clear error when it is missing.
    pub fn gerrit(&self) -> Result<&GerritConfig, ConfigError> {
        self.gerrit.as_ref().ok_or_else(|| {
            ConfigError::Invalid(
                "the 'gerrit' section is required for Gerrit-integrated reviews".into(),
            )
        })
    }
}
