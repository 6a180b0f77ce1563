//! Review context assembly.
//!
//! Loads instruction text, reference documents, and changed-file
//! contents, then delegates the selection decision to the pure budget
//! planner in [`budget`]. The result is a [`ReviewContext`] that is
//! guaranteed to fit the configured token budget.

pub mod budget;
pub mod refs;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use thiserror::Error;

use crate::config::ReviewTypeConfig;
use crate::models::context::{ReviewContext, SelectedFile};
use crate::models::ChangedFile;

use budget::{estimate_tokens, plan_context, BudgetError, FileCandidate};

/// Errors during context assembly.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("failed to read instruction file {path}: {source}")]
    UnreadableInstruction {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read reference document {path}: {source}")]
    UnreadableReference {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Budget(#[from] BudgetError),
}

/// Build the review context for one review type.
///
/// `instruction_override` replaces the configured instruction file when
/// given (the `--instruction` CLI flag). Changed files that cannot be
/// read from the checkout (deleted by the patch, or binary) are
/// silently excluded from candidacy.
pub async fn build_review_context(
    repo_dir: &Path,
    files: &[ChangedFile],
    diff: &str,
    type_config: &ReviewTypeConfig,
    instruction_override: Option<&Path>,
    ignored_dirs: &[String],
    budget: usize,
    max_files: usize,
) -> Result<ReviewContext, ContextError> {
    let instruction_path = instruction_override.unwrap_or(type_config.instruction_file.as_path());
    let instruction = tokio::fs::read_to_string(instruction_path)
        .await
        .map_err(|e| ContextError::UnreadableInstruction {
            path: instruction_path.to_path_buf(),
            source: e,
        })?;

    let references = refs::load_reference_docs(&type_config.reference_files).await?;

    let (candidates, contents) = load_candidates(repo_dir, files, ignored_dirs).await;

    let instruction_tokens = estimate_tokens(&instruction);
    let reference_tokens: usize = references.iter().map(|d| d.tokens).sum();
    let diff_tokens = estimate_tokens(diff);

    let plan = plan_context(
        instruction_tokens,
        reference_tokens,
        diff_tokens,
        &candidates,
        ignored_dirs,
        budget,
        max_files,
    )?;

    let selected = plan
        .selected
        .iter()
        .map(|path| {
            let content = contents.get(path).cloned().unwrap_or_default();
            let changed_lines = files
                .iter()
                .find(|f| &f.path == path)
                .map(|f| f.changed_lines())
                .unwrap_or(0);
            SelectedFile {
                tokens: estimate_tokens(&content),
                path: path.clone(),
                content,
                changed_lines,
            }
        })
        .collect();

    Ok(ReviewContext {
        instruction,
        references: if plan.include_references {
            references
        } else {
            Vec::new()
        },
        files: selected,
        diff: diff.to_string(),
        estimated_tokens: plan.estimated_tokens,
    })
}

/// Load candidate file contents from the checked-out tree.
///
/// Ignore-listed paths are filtered before any I/O so that a large
/// excluded test directory costs nothing to consider.
async fn load_candidates(
    repo_dir: &Path,
    files: &[ChangedFile],
    ignored_dirs: &[String],
) -> (Vec<FileCandidate>, IndexMap<String, String>) {
    let mut candidates = Vec::new();
    let mut contents = IndexMap::new();

    for file in files {
        if budget::is_ignored(&file.path, ignored_dirs) {
            continue;
        }

        let full_path = repo_dir.join(&file.path);
        match tokio::fs::read_to_string(&full_path).await {
            Ok(content) => {
                candidates.push(FileCandidate {
                    path: file.path.clone(),
                    changed_lines: file.changed_lines(),
                    tokens: estimate_tokens(&content),
                });
                contents.insert(file.path.clone(), content);
            }
            Err(_) => {
                // Deleted by the patch, binary, or unreadable: not a
                // candidate.
                continue;
            }
        }
    }

    (candidates, contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed(path: &str, insertions: u64, deletions: u64) -> ChangedFile {
        ChangedFile {
            path: path.to_string(),
            insertions,
            deletions,
        }
    }

    fn type_config(dir: &Path, reference_files: Vec<PathBuf>) -> ReviewTypeConfig {
        ReviewTypeConfig {
            instruction_file: dir.join("instruction.md"),
            reference_files,
        }
    }

    #[tokio::test]
    async fn builds_full_context() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("instruction.md"), "Review carefully.").unwrap();
        std::fs::write(dir.path().join("style.md"), "Tabs only.").unwrap();
        std::fs::write(dir.path().join("main.c"), "int main(void) { return 0; }\n").unwrap();

        let cfg = type_config(dir.path(), vec![dir.path().join("style.md")]);
        let files = vec![changed("main.c", 10, 2)];

        let ctx = build_review_context(
            dir.path(),
            &files,
            "diff text",
            &cfg,
            None,
            &[],
            10_000,
            3,
        )
        .await
        .unwrap();

        assert_eq!(ctx.instruction, "Review carefully.");
        assert_eq!(ctx.references.len(), 1);
        assert_eq!(ctx.files.len(), 1);
        assert_eq!(ctx.files[0].path, "main.c");
        assert_eq!(ctx.files[0].changed_lines, 12);
        assert!(ctx.estimated_tokens <= 10_000);
    }

    #[tokio::test]
    async fn missing_instruction_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = type_config(dir.path(), vec![]);

        let result =
            build_review_context(dir.path(), &[], "diff", &cfg, None, &[], 1000, 3).await;
        assert!(matches!(
            result,
            Err(ContextError::UnreadableInstruction { .. })
        ));
    }

    #[tokio::test]
    async fn instruction_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("instruction.md"), "configured").unwrap();
        let override_path = dir.path().join("custom.md");
        std::fs::write(&override_path, "overridden").unwrap();

        let cfg = type_config(dir.path(), vec![]);
        let ctx = build_review_context(
            dir.path(),
            &[],
            "diff",
            &cfg,
            Some(&override_path),
            &[],
            1000,
            3,
        )
        .await
        .unwrap();
        assert_eq!(ctx.instruction, "overridden");
    }

    #[tokio::test]
    async fn deleted_files_are_not_candidates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("instruction.md"), "go").unwrap();

        let cfg = type_config(dir.path(), vec![]);
        // File appears in the diff stats but does not exist on disk.
        let files = vec![changed("removed.c", 0, 120)];

        let ctx = build_review_context(dir.path(), &files, "diff", &cfg, None, &[], 1000, 3)
            .await
            .unwrap();
        assert!(ctx.files.is_empty());
    }

    #[tokio::test]
    async fn references_over_budget_fail_loudly() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("instruction.md"), "go").unwrap();
        std::fs::write(dir.path().join("big-ref.md"), "x".repeat(8000)).unwrap();

        let cfg = type_config(dir.path(), vec![dir.path().join("big-ref.md")]);
        let result = build_review_context(dir.path(), &[], "diff", &cfg, None, &[], 100, 3).await;
        assert!(matches!(result, Err(ContextError::Budget(_))));
    }

    #[tokio::test]
    async fn oversized_diff_drops_references() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("instruction.md"), "go").unwrap();
        std::fs::write(dir.path().join("ref.md"), "short ref").unwrap();

        let cfg = type_config(dir.path(), vec![dir.path().join("ref.md")]);
        let big_diff = "x".repeat(4000); // ~1000 tokens
        let ctx = build_review_context(dir.path(), &[], &big_diff, &cfg, None, &[], 1001, 3)
            .await
            .unwrap();
        assert!(ctx.references.is_empty());
        assert!(ctx.files.is_empty());
    }

    #[tokio::test]
    async fn ignored_dir_files_never_read_or_selected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("instruction.md"), "go").unwrap();
        std::fs::create_dir_all(dir.path().join("tests")).unwrap();
        std::fs::write(dir.path().join("tests/huge.sh"), "x".repeat(100)).unwrap();
        std::fs::write(dir.path().join("small.c"), "int x;").unwrap();

        let cfg = type_config(dir.path(), vec![]);
        let files = vec![changed("tests/huge.sh", 500, 0), changed("small.c", 1, 0)];
        let ignored = vec!["tests".to_string()];

        let ctx = build_review_context(dir.path(), &files, "d", &cfg, None, &ignored, 1000, 3)
            .await
            .unwrap();
        assert_eq!(ctx.file_paths(), vec!["small.c"]);
    }
}
