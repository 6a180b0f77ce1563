//! Shared types used across all modules.
//!
//! This module defines the core data structures for changes, review
//! context, and review results. Other modules import from here rather
//! than reaching into each other's internals.

pub mod change;
pub mod context;
pub mod review;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use change::{Change, ChangedFile};
pub use context::{ReferenceDocument, ReviewContext, SelectedFile};
pub use review::ReviewResult;

/// The kinds of review this tool can run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewType {
    /// General correctness and design review.
    Generic,
    /// Coding-style conformance review.
    Style,
    /// Static-analysis style defect hunting.
    StaticAnalysis,
}

impl ReviewType {
    /// All review types in the order they are run and posted.
    pub fn all() -> [ReviewType; 3] {
        [
            ReviewType::Generic,
            ReviewType::Style,
            ReviewType::StaticAnalysis,
        ]
    }

    /// Human-readable label used in output headers and Gerrit comments.
    pub fn label(self) -> &'static str {
        match self {
            ReviewType::Generic => "generic",
            ReviewType::Style => "style",
            ReviewType::StaticAnalysis => "static analysis",
        }
    }
}

impl fmt::Display for ReviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewType::Generic => write!(f, "generic"),
            ReviewType::Style => write!(f, "style"),
            ReviewType::StaticAnalysis => write!(f, "static-analysis"),
        }
    }
}

impl std::str::FromStr for ReviewType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "generic" => Ok(ReviewType::Generic),
            "style" => Ok(ReviewType::Style),
            "static-analysis" | "static_analysis" => Ok(ReviewType::StaticAnalysis),
            other => Err(format!(
                "unknown review type: '{other}'. Supported: generic, style, static-analysis"
            )),
        }
    }
}

/// Model tier selection: the free tier is the default for local runs,
/// the paid tier for Gerrit-integrated runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    #[default]
    Free,
    Paid,
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelTier::Free => write!(f, "free"),
            ModelTier::Paid => write!(f, "paid"),
        }
    }
}

impl ModelTier {
    /// The tier to try when this one is not configured.
    pub fn fallback(self) -> ModelTier {
        match self {
            ModelTier::Free => ModelTier::Paid,
            ModelTier::Paid => ModelTier::Free,
        }
    }
}

/// Supported assistant backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendName {
    /// The aider CLI (default).
    #[default]
    Aider,
    /// The Augment CLI (`auggie`).
    Augment,
}

impl fmt::Display for BackendName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendName::Aider => write!(f, "aider"),
            BackendName::Augment => write!(f, "augment"),
        }
    }
}

impl std::str::FromStr for BackendName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aider" => Ok(BackendName::Aider),
            "augment" => Ok(BackendName::Augment),
            other => Err(format!(
                "unsupported backend: '{other}'. Supported: aider, augment"
            )),
        }
    }
}
