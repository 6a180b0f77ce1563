//! Reference document loading.

use std::path::{Path, PathBuf};

use crate::models::ReferenceDocument;

use super::budget::estimate_tokens;
use super::ContextError;

/// Load reference documents from disk, in configured order.
///
/// Every file must be readable. Reference material is mandatory
/// guidance, and a missing style guide is a configuration error, not
/// something to skip over.
pub async fn load_reference_docs(
    paths: &[PathBuf],
) -> Result<Vec<ReferenceDocument>, ContextError> {
    let mut docs = Vec::with_capacity(paths.len());

    for path in paths {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ContextError::UnreadableReference {
                path: path.clone(),
                source: e,
            })?;
        let tokens = estimate_tokens(&content);
        docs.push(ReferenceDocument {
            name: doc_name(path),
            content,
            tokens,
        });
    }

    Ok(docs)
}

/// Display name for a reference document: its file name.
fn doc_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
