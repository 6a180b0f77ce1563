//! Diff engine: git CLI wrapper and `--numstat` parsing.

pub mod git;

use thiserror::Error;

use crate::models::ChangedFile;

/// Errors from the diff engine.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("git command failed: {0}")]
    GitError(String),

    #[error("repository directory not found: {0}")]
    RepoNotFound(String),
}

/// Parse `git diff --numstat` output into changed-file stats.
///
/// Each line is `<insertions>\t<deletions>\t<path>`. Binary files are
/// reported with `-` in both count columns and are skipped; they are
/// never candidates for context inclusion.
pub fn parse_numstat(output: &str) -> Vec<ChangedFile> {
    let mut files = Vec::new();

    for line in output.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.splitn(3, '\t');
        let (Some(ins), Some(del), Some(path)) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };

        let (Ok(insertions), Ok(deletions)) = (ins.parse::<u64>(), del.parse::<u64>()) else {
            // Binary files are marked `-`.
            continue;
        };

        if insertions == 0 && deletions == 0 {
            continue;
        }

        files.push(ChangedFile {
            path: path.to_string(),
            insertions,
            deletions,
        });
    }

    files
}
