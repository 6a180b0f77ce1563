//! Augment CLI backend.
//!
//! Pipes the rendered prompt to `auggie --print --quiet` on stdin.
//! Auggie manages its own authentication session, so no API key is
//! injected; the configured model name is forwarded as-is.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::config::ModelConfig;

use super::{Assistant, AssistantError};

pub struct AugmentAssistant {
    repo_dir: PathBuf,
    command: PathBuf,
}

impl AugmentAssistant {
    pub fn new(repo_dir: &Path) -> Self {
        Self {
            repo_dir: repo_dir.to_path_buf(),
            command: PathBuf::from("auggie"),
        }
    }

    /// Override the binary invoked. Used by tests to substitute a stub.
    pub fn with_command(repo_dir: &Path, command: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.to_path_buf(),
            command: command.into(),
        }
    }
}

#[async_trait]
impl Assistant for AugmentAssistant {
    fn name(&self) -> &'static str {
        "augment"
    }

    async fn review(
        &self,
        prompt: &str,
        model: &ModelConfig,
        _api_key: Option<&str>,
    ) -> Result<String, AssistantError> {
        let mut child = tokio::process::Command::new(&self.command)
            .args(["--print", "--quiet", "--model", &model.model])
            .current_dir(&self.repo_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    AssistantError::ToolNotFound(self.command.display().to_string())
                }
                _ => AssistantError::Io(e),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(prompt.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(AssistantError::Invocation {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(AssistantError::EmptyResponse);
        }

        Ok(text)
    }
}
