//! Assistant invocation boundary.
//!
//! The AI assistant is an installed external tool invoked as a
//! subprocess: it receives one rendered prompt and returns review text
//! on stdout. Failures are surfaced as explicit error values, never
//! swallowed.

pub mod aider;
pub mod augment;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ModelConfig;
use crate::models::BackendName;

/// Errors from assistant invocation.
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("assistant tool '{0}' not found — is it installed and on PATH?")]
    ToolNotFound(String),

    #[error("assistant exited with {status}: {stderr}")]
    Invocation { status: String, stderr: String },

    #[error("assistant produced no output")]
    EmptyResponse,

    #[error("no API key available for model '{model}' (set {env})")]
    MissingApiKey { model: String, env: String },

    #[error("failed to prepare assistant input: {0}")]
    Io(#[from] std::io::Error),
}

/// A black-box text-completion engine that reviews code.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Backend name for status output.
    fn name(&self) -> &'static str;

    /// Run one review: send the rendered prompt, return the review
    /// text. `api_key` is exported to the subprocess under the model's
    /// configured environment variable when the backend needs it.
    async fn review(
        &self,
        prompt: &str,
        model: &ModelConfig,
        api_key: Option<&str>,
    ) -> Result<String, AssistantError>;
}

/// Construct the configured backend.
pub fn create(backend: BackendName, repo_dir: &Path) -> Box<dyn Assistant> {
    match backend {
        BackendName::Aider => Box::new(aider::AiderAssistant::new(repo_dir)),
        BackendName::Augment => Box::new(augment::AugmentAssistant::new(repo_dir)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_returns_selected_backend() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(create(BackendName::Aider, dir.path()).name(), "aider");
        assert_eq!(create(BackendName::Augment, dir.path()).name(), "augment");
    }
}
