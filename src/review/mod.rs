//! Sequential review execution.
//!
//! Runs the requested review types one after another: build a budgeted
//! context, confirm the cost with the operator, invoke the assistant,
//! collect the result. A failure in one review type is recorded and
//! the remaining types still run. A style review that blows the token
//! budget must not take the generic review down with it.

use std::path::{Path, PathBuf};

use crate::assistant::Assistant;
use crate::config::{Config, ModelConfig, ReviewTypeConfig};
use crate::context::{self, ContextError};
use crate::diff::{self, git, DiffError};
use crate::env::Env;
use crate::models::{Change, ModelTier, ReviewContext, ReviewResult, ReviewType};
use crate::ui;

/// Per-run options resolved from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Requested model tier; falls back to the other tier when the
    /// requested one is unusable.
    pub tier: ModelTier,
    /// `--instruction` override, applied to every requested type.
    pub instruction_override: Option<PathBuf>,
    /// `--max-tokens` override.
    pub max_tokens: Option<usize>,
    /// `--max-files` override.
    pub max_files: Option<usize>,
    /// Skip the cost confirmation prompt.
    pub assume_yes: bool,
    /// Print selection details.
    pub verbose: bool,
}

/// What a run produced: completed reviews plus per-type failures.
#[derive(Debug)]
pub struct RunOutcome {
    pub results: Vec<ReviewResult>,
    pub failures: Vec<(ReviewType, String)>,
}

impl RunOutcome {
    /// True when nothing completed at all.
    pub fn all_failed(&self) -> bool {
        self.results.is_empty() && !self.failures.is_empty()
    }

    /// Review types that completed, in execution order.
    pub fn completed_kinds(&self) -> Vec<ReviewType> {
        self.results.iter().map(|r| r.kind).collect()
    }
}

/// Drives the review types sequentially against one change.
pub struct ReviewRunner<'a> {
    config: &'a Config,
    assistant: Box<dyn Assistant>,
    env: Env,
    options: RunOptions,
}

impl<'a> ReviewRunner<'a> {
    pub fn new(
        config: &'a Config,
        assistant: Box<dyn Assistant>,
        env: Env,
        options: RunOptions,
    ) -> Self {
        Self {
            config,
            assistant,
            env,
            options,
        }
    }

    fn max_tokens(&self) -> usize {
        self.options
            .max_tokens
            .unwrap_or(self.config.review.max_tokens)
    }

    fn max_files(&self) -> usize {
        self.options
            .max_files
            .unwrap_or(self.config.review.max_files)
    }

    /// Run the requested review types in order.
    pub async fn run(&self, change: &Change, kinds: &[ReviewType]) -> RunOutcome {
        let mut results = Vec::new();
        let mut failures = Vec::new();

        for &kind in kinds {
            ui::status(&format!("running {kind} review of '{}'", change.subject));
            match self.run_one(change, kind).await {
                Ok(result) => {
                    ui::status(&format!("{kind} review completed"));
                    results.push(result);
                }
                Err(reason) => {
                    ui::error(&format!("{kind} review failed: {reason}"));
                    failures.push((kind, reason));
                }
            }
        }

        RunOutcome { results, failures }
    }

    async fn run_one(&self, change: &Change, kind: ReviewType) -> Result<ReviewResult, String> {
        let (model, api_key) = self.resolve_model()?;
        let type_config = self.config.review.for_type(kind);

        let ctx = self
            .build_context(change, kind, type_config)
            .await
            .map_err(|e| e.to_string())?;

        if self.options.verbose {
            for file in &ctx.files {
                ui::status(&format!(
                    "  selected {} ({} changed lines, ~{} tokens)",
                    file.path, file.changed_lines, file.tokens,
                ));
            }
        }
        ui::status(&format!(
            "context: {} reference doc(s), {} file(s), ~{} tokens (budget {})",
            ctx.references.len(),
            ctx.files.len(),
            ctx.estimated_tokens,
            self.max_tokens(),
        ));

        if !self.options.assume_yes
            && !ui::confirm("Do you want to proceed with this request?")
        {
            return Err("cancelled by operator".to_string());
        }

        let text = self
            .assistant
            .review(&ctx.render(), model, api_key.as_deref())
            .await
            .map_err(|e| e.to_string())?;

        Ok(ReviewResult { kind, text })
    }

    /// Pick a usable model tier: the requested one, or the other tier
    /// as a fallback when the requested one is not configured (or has
    /// no API key for a backend that needs one).
    fn resolve_model(&self) -> Result<(&ModelConfig, Option<String>), String> {
        let requested = self.options.tier;

        for tier in [requested, requested.fallback()] {
            let Some(model) = self.config.assistant.tier(tier) else {
                if tier == requested {
                    ui::warn(&format!("{tier} model tier is not configured"));
                }
                continue;
            };

            let api_key = model.resolve_api_key(&self.env);
            if api_key.is_none() && tier == requested {
                ui::warn(&format!(
                    "no API key for the {tier} model tier (checked {})",
                    model.api_key_env,
                ));
            }

            if tier != requested {
                ui::status(&format!("falling back to the {tier} model tier"));
            }
            return Ok((model, api_key));
        }

        Err("no model tier configured — add assistant.free or assistant.paid".to_string())
    }

    /// Build the context for one review type.
    ///
    /// Static analysis prefers a function-context diff (whole functions
    /// around each hunk); when that pushes the reference documents out
    /// of budget it retries with the plain diff.
    async fn build_context(
        &self,
        change: &Change,
        kind: ReviewType,
        type_config: &ReviewTypeConfig,
    ) -> Result<ReviewContext, ContextError> {
        if kind == ReviewType::StaticAnalysis {
            match git::show_diff(
                &self.config.repo_dir,
                true,
                &self.config.review.diff_excludes,
            )
            .await
            {
                Ok(func_diff) => {
                    let ctx = self.build_with_diff(change, &func_diff, type_config).await?;
                    let refs_dropped =
                        !type_config.reference_files.is_empty() && ctx.references.is_empty();
                    if !refs_dropped {
                        return Ok(ctx);
                    }
                    ui::warn(
                        "function-context diff does not fit the budget, retrying with the plain diff",
                    );
                }
                Err(e) => {
                    ui::warn(&format!("could not produce function-context diff: {e}"));
                }
            }
        }

        self.build_with_diff(change, &change.diff, type_config).await
    }

    async fn build_with_diff(
        &self,
        change: &Change,
        diff_text: &str,
        type_config: &ReviewTypeConfig,
    ) -> Result<ReviewContext, ContextError> {
        context::build_review_context(
            &self.config.repo_dir,
            &change.files,
            diff_text,
            type_config,
            self.options.instruction_override.as_deref(),
            &self.config.review.ignored_dirs,
            self.max_tokens(),
            self.max_files(),
        )
        .await
    }
}

/// Assemble a [`Change`] from the repository's HEAD commit.
///
/// Used directly by local reviews; the Gerrit driver checks the patch
/// out first and then overlays the REST metadata on top of this.
pub async fn load_change_from_head(
    repo: &Path,
    excludes: &[String],
) -> Result<Change, DiffError> {
    let stats = git::numstat(repo).await?;
    let files = diff::parse_numstat(&stats);
    let diff_text = git::show_diff(repo, false, excludes).await?;
    let revision = git::head_commit(repo).await?;

    Ok(Change {
        id: revision.clone(),
        number: None,
        subject: git::head_subject(repo).await?,
        branch: git::current_branch(repo).await?,
        revision,
        files,
        diff: diff_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::AssistantError;
    use crate::config::loader::{AssistantConfig, ReviewSettings};
    use crate::models::ChangedFile;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Test double that records invocations and returns canned text.
    struct StubAssistant {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl Assistant for StubAssistant {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn review(
            &self,
            prompt: &str,
            _model: &ModelConfig,
            _api_key: Option<&str>,
        ) -> Result<String, AssistantError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AssistantError::EmptyResponse);
            }
            Ok(format!("reviewed {} bytes", prompt.len()))
        }
    }

    fn test_config(dir: &Path) -> Config {
        let instruction = dir.join("instruction.md");
        std::fs::write(&instruction, "Review this.").unwrap();

        let type_config = ReviewTypeConfig {
            instruction_file: instruction,
            reference_files: vec![],
        };

        Config {
            repo_dir: dir.to_path_buf(),
            review: ReviewSettings {
                max_tokens: 100_000,
                max_files: 3,
                ignored_dirs: vec![],
                diff_excludes: vec![],
                generic: type_config.clone(),
                style: type_config.clone(),
                static_analysis: type_config,
            },
            assistant: AssistantConfig {
                backend: Default::default(),
                free: Some(ModelConfig {
                    model: "test/free".into(),
                    api_key: Some("sk-free".into()),
                    api_key_env: "GEMINI_API_KEY".into(),
                }),
                paid: None,
            },
            gerrit: None,
        }
    }

    fn test_change() -> Change {
        Change {
            id: "deadbeef".into(),
            number: None,
            subject: "test change".into(),
            branch: "master".into(),
            revision: "deadbeef".into(),
            files: vec![ChangedFile {
                path: "main.c".into(),
                insertions: 2,
                deletions: 0,
            }],
            diff: "+int b;\n".into(),
        }
    }

    fn runner_with<'a>(
        config: &'a Config,
        calls: Arc<AtomicUsize>,
        fail: bool,
    ) -> ReviewRunner<'a> {
        ReviewRunner::new(
            config,
            Box::new(StubAssistant { calls, fail }),
            Env::mock(Vec::<(&str, &str)>::new()),
            RunOptions {
                assume_yes: true,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn runs_requested_types_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.c"), "int a;\nint b;\n").unwrap();
        let config = test_config(dir.path());
        let calls = Arc::new(AtomicUsize::new(0));
        let runner = runner_with(&config, Arc::clone(&calls), false);

        let outcome = runner
            .run(&test_change(), &[ReviewType::Generic, ReviewType::Style])
            .await;

        assert_eq!(outcome.results.len(), 2);
        assert!(outcome.failures.is_empty());
        assert_eq!(
            outcome.completed_kinds(),
            vec![ReviewType::Generic, ReviewType::Style]
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn assistant_failure_does_not_abort_other_types() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let calls = Arc::new(AtomicUsize::new(0));
        let runner = runner_with(&config, Arc::clone(&calls), true);

        let outcome = runner
            .run(&test_change(), &[ReviewType::Generic, ReviewType::Style])
            .await;

        assert!(outcome.results.is_empty());
        assert_eq!(outcome.failures.len(), 2);
        assert!(outcome.all_failed());
        // Both types were still attempted.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn budget_failure_is_isolated_to_its_type() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());

        // Give the style review an impossible reference load.
        let big_ref = dir.path().join("big.md");
        std::fs::write(&big_ref, "x".repeat(500_000)).unwrap();
        config.review.style.reference_files = vec![big_ref];

        let calls = Arc::new(AtomicUsize::new(0));
        let runner = runner_with(&config, Arc::clone(&calls), false);

        let outcome = runner
            .run(&test_change(), &[ReviewType::Style, ReviewType::Generic])
            .await;

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].kind, ReviewType::Generic);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, ReviewType::Style);
        assert!(!outcome.all_failed());
        // Only the generic review reached the assistant.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn falls_back_to_other_tier_when_requested_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path()); // only the free tier exists
        let calls = Arc::new(AtomicUsize::new(0));

        let runner = ReviewRunner::new(
            &config,
            Box::new(StubAssistant {
                calls: Arc::clone(&calls),
                fail: false,
            }),
            Env::mock(Vec::<(&str, &str)>::new()),
            RunOptions {
                tier: ModelTier::Paid,
                assume_yes: true,
                ..Default::default()
            },
        );

        let outcome = runner.run(&test_change(), &[ReviewType::Generic]).await;
        assert_eq!(outcome.results.len(), 1);
    }

    #[tokio::test]
    async fn no_tier_configured_is_a_per_type_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.assistant.free = None;

        let calls = Arc::new(AtomicUsize::new(0));
        let runner = runner_with(&config, Arc::clone(&calls), false);

        let outcome = runner.run(&test_change(), &[ReviewType::Generic]).await;
        assert!(outcome.all_failed());
        assert!(outcome.failures[0].1.contains("no model tier configured"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn load_change_from_head_reads_repo() {
        // Minimal two-commit repo.
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path();
        for args in [
            vec!["init", "-b", "master"],
            vec!["config", "user.email", "t@t.com"],
            vec!["config", "user.name", "T"],
        ] {
            tokio::process::Command::new("git")
                .args(&args)
                .current_dir(p)
                .output()
                .await
                .unwrap();
        }
        tokio::fs::write(p.join("a.c"), "int a;\n").await.unwrap();
        for args in [vec!["add", "."], vec!["commit", "-m", "base"]] {
            tokio::process::Command::new("git")
                .args(&args)
                .current_dir(p)
                .output()
                .await
                .unwrap();
        }
        tokio::fs::write(p.join("a.c"), "int a;\nint b;\n").await.unwrap();
        for args in [vec!["add", "."], vec!["commit", "-m", "add b"]] {
            tokio::process::Command::new("git")
                .args(&args)
                .current_dir(p)
                .output()
                .await
                .unwrap();
        }

        let change = load_change_from_head(p, &[]).await.unwrap();
        assert_eq!(change.subject, "add b");
        assert_eq!(change.branch, "master");
        assert_eq!(change.files.len(), 1);
        assert_eq!(change.files[0].path, "a.c");
        assert!(change.diff.contains("+int b;"));
        assert_eq!(change.id, change.revision);
    }
}
