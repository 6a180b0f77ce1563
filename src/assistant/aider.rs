//! aider CLI backend.
//!
//! Writes the rendered prompt to a temporary message file and runs
//! `aider` non-interactively in the repository checkout. aider reads
//! its API key from an environment variable (which one depends on the
//! model family), so the key is injected into the subprocess
//! environment rather than passed as an argument.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;

use crate::config::ModelConfig;

use super::{Assistant, AssistantError};

pub struct AiderAssistant {
    repo_dir: PathBuf,
    command: PathBuf,
}

impl AiderAssistant {
    pub fn new(repo_dir: &Path) -> Self {
        Self {
            repo_dir: repo_dir.to_path_buf(),
            command: PathBuf::from("aider"),
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
impl Assistant for AiderAssistant {
    fn name(&self) -> &'static str {
        "aider"
    }

    async fn review(
        &self,
        prompt: &str,
        model: &ModelConfig,
        api_key: Option<&str>,
    ) -> Result<String, AssistantError> {
        let api_key = api_key.ok_or_else(|| AssistantError::MissingApiKey {
            model: model.model.clone(),
            env: model.api_key_env.clone(),
        })?;

        // The prompt can be hundreds of kilobytes, so it goes in a
        // message file rather than the argument list.
        let mut message_file = tempfile::NamedTempFile::new()?;
        message_file.write_all(prompt.as_bytes())?;
        message_file.flush()?;

        let output = tokio::process::Command::new(&self.command)
            .args([
                "--model",
                &model.model,
                "--yes-always",
                "--no-auto-commits",
                "--no-pretty",
                "--no-stream",
                "--message-file",
            ])
            .arg(message_file.path())
            .env(&model.api_key_env, api_key)
            .current_dir(&self.repo_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    AssistantError::ToolNotFound(self.command.display().to_string())
                }
                _ => AssistantError::Io(e),
            })?;

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
