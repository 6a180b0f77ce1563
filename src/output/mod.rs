//! Local review output.

use std::path::Path;

use crate::models::ReviewResult;

/// Render results for a local destination (file or stdout).
///
/// A single result is passed through verbatim. Multiple results are
/// separated with headers so the reader can tell the review types
/// apart.
pub fn render_results(results: &[ReviewResult]) -> String {
    match results {
        [] => String::new(),
        [single] => {
            let mut text = single.text.clone();
            if !text.ends_with('\n') {
                text.push('\n');
            }
            text
        }
        many => {
            let mut out = String::new();
            for result in many {
                out.push_str(&format!("## {} review\n\n", result.kind.label()));
                out.push_str(result.text.trim_end());
                out.push_str("\n\n");
            }
            out
        }
    }
}

/// Write rendered results to a file, creating parent directories.
pub async fn write_reviews(path: &Path, results: &[ReviewResult]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, render_results(results)).await
}
