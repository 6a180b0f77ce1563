//! Git CLI wrapper.
//!
//! Shells out to `git` via `tokio::process::Command`, always with the
//! repository directory as the working directory. Covers the commands
//! the review flow needs: checkout hygiene, patch checkout, diff stats,
//! and diff text.

use std::path::Path;

use super::DiffError;

/// Run a git command and return its stdout.
async fn run_git(repo: &Path, args: &[&str]) -> Result<String, DiffError> {
    if !repo.is_dir() {
        return Err(DiffError::RepoNotFound(repo.display().to_string()));
    }

    let output = tokio::process::Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .await
        .map_err(|e| DiffError::GitError(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DiffError::GitError(format!(
            "git {} failed (exit {}): {}",
            args.first().unwrap_or(&""),
            output.status,
            stderr.trim(),
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|e| DiffError::GitError(format!("git output is not valid UTF-8: {e}")))
}

/// Whether the working tree has uncommitted changes.
pub async fn has_uncommitted_changes(repo: &Path) -> Result<bool, DiffError> {
    let output = run_git(repo, &["status", "--porcelain"]).await?;
    Ok(!output.trim().is_empty())
}

/// Discard all uncommitted changes.
pub async fn reset_hard(repo: &Path) -> Result<(), DiffError> {
    run_git(repo, &["reset", "--hard"]).await?;
    Ok(())
}

/// Remove untracked files and directories.
pub async fn clean_untracked(repo: &Path) -> Result<(), DiffError> {
    run_git(repo, &["clean", "-df"]).await?;
    Ok(())
}

/// Fetch a change ref and check out `FETCH_HEAD`.
pub async fn fetch_and_checkout(repo: &Path, url: &str, refspec: &str) -> Result<(), DiffError> {
    run_git(repo, &["fetch", url, refspec]).await?;
    run_git(repo, &["checkout", "FETCH_HEAD"]).await?;
    Ok(())
}

/// One-line summary of the HEAD commit, for verification output.
pub async fn head_summary(repo: &Path) -> Result<String, DiffError> {
    let output = run_git(repo, &["log", "-1", "--oneline"]).await?;
    Ok(output.trim().to_string())
}

/// Subject line of the HEAD commit.
pub async fn head_subject(repo: &Path) -> Result<String, DiffError> {
    let output = run_git(repo, &["log", "-1", "--format=%s"]).await?;
    Ok(output.trim().to_string())
}

/// Full SHA of the HEAD commit.
pub async fn head_commit(repo: &Path) -> Result<String, DiffError> {
    let output = run_git(repo, &["rev-parse", "HEAD"]).await?;
    Ok(output.trim().to_string())
}

/// Name of the currently checked-out branch (`HEAD` when detached).
pub async fn current_branch(repo: &Path) -> Result<String, DiffError> {
    let output = run_git(repo, &["rev-parse", "--abbrev-ref", "HEAD"]).await?;
    Ok(output.trim().to_string())
}

/// Per-file change stats for the HEAD commit.
pub async fn numstat(repo: &Path) -> Result<String, DiffError> {
    run_git(repo, &["--no-pager", "diff", "--numstat", "HEAD^", "HEAD"]).await
}

/// Unified diff text of the HEAD commit.
///
/// With `function_context`, hunks are expanded to whole functions,
/// which is larger but far more useful for reasoning about C code. `excludes`
/// are git pathspec patterns removed from the diff (e.g. generated
/// wire-format checks).
pub async fn show_diff(
    repo: &Path,
    function_context: bool,
    excludes: &[String],
) -> Result<String, DiffError> {
    let mut args: Vec<String> = vec!["--no-pager".into(), "show".into()];
    if function_context {
        args.push("--function-context".into());
    }
    args.push("--".into());
    args.push(".".into());
    for pattern in excludes {
        args.push(format!(":!{pattern}"));
    }

    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    run_git(repo, &arg_refs).await
}
