//! Change-related types: the unit under review and its changed files.

use serde::{Deserialize, Serialize};

/// A single file touched by a change, with its diff stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Path relative to the repository root.
    pub path: String,
    /// Lines added.
    pub insertions: u64,
    /// Lines removed.
    pub deletions: u64,
}

impl ChangedFile {
    /// Total changed lines, the ranking key for file selection.
    pub fn changed_lines(&self) -> u64 {
        self.insertions + self.deletions
    }
}

/// The unit under review: one patch set, immutable for the duration
/// of a review run.
///
/// For Gerrit-driven runs the metadata comes from the REST API and the
/// diff/stats from the locally checked-out patch. For local runs the
/// whole thing is derived from the repository's HEAD commit.
#[derive(Debug, Clone)]
pub struct Change {
    /// Gerrit change id, or the commit hash for local reviews.
    pub id: String,
    /// Gerrit change number, when known.
    pub number: Option<u64>,
    /// Commit subject line.
    pub subject: String,
    /// Target branch.
    pub branch: String,
    /// SHA of the revision under review.
    pub revision: String,
    /// Files modified by the change, unranked.
    pub files: Vec<ChangedFile>,
    /// Unified diff text of the change.
    pub diff: String,
}
