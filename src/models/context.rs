//! Review context types.

/// A named block of static reference text (style guide, architecture
/// map) with its precomputed token cost. Loaded once from disk,
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct ReferenceDocument {
    /// Display name (the file name it was loaded from).
    pub name: String,
    /// The document text.
    pub content: String,
    /// Estimated token cost of `content`.
    pub tokens: usize,
}

/// A changed file whose full content was selected into the context.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// Path relative to the repository root.
    pub path: String,
    /// File content as read from the checked-out tree.
    pub content: String,
    /// Estimated token cost of `content`.
    pub tokens: usize,
    /// Changed-line count that ranked this file.
    pub changed_lines: u64,
}

/// The complete bundle handed to the assistant for one review
/// invocation. Construction goes through the context builder, which
/// guarantees the budget invariant: the estimated total token cost
/// never exceeds the configured maximum.
#[derive(Debug, Clone)]
pub struct ReviewContext {
    /// Instruction text for this review type.
    pub instruction: String,
    /// Reference documents, in configured order. Empty when the
    /// builder had to fall back to a diff-only context.
    pub references: Vec<ReferenceDocument>,
    /// Selected changed files, in rank order.
    pub files: Vec<SelectedFile>,
    /// The unified diff of the change.
    pub diff: String,
    /// Estimated token cost of the whole context.
    pub estimated_tokens: usize,
}

impl ReviewContext {
    /// Render the context into the single prompt string sent to the
    /// assistant. Section order: references, file contents, diff,
    /// instruction last.
    pub fn render(&self) -> String {
        let mut out = String::new();

        if !self.references.is_empty() {
            out.push_str("# Reference material\n\n");
            for doc in &self.references {
                out.push_str(&format!("## {}\n\n{}\n\n", doc.name, doc.content));
            }
        }

        if !self.files.is_empty() {
            out.push_str("# Changed files\n\n");
            for file in &self.files {
                out.push_str(&format!("## {}\n\n```\n{}\n```\n\n", file.path, file.content));
            }
        }

        out.push_str(&format!("# Patch under review\n\n```diff\n{}\n```\n\n", self.diff));
        out.push_str(&format!("# Task\n\n{}\n", self.instruction));

        out
    }

    /// Paths of the selected files, in rank order.
    pub fn file_paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_context() -> ReviewContext {
        ReviewContext {
            instruction: "Review this patch.".into(),
            references: vec![ReferenceDocument {
                name: "coding-style.md".into(),
                content: "Tabs, not spaces.".into(),
                tokens: 5,
            }],
            files: vec![SelectedFile {
                path: "lustre/llite/file.c".into(),
                content: "int f(void) { return 0; }".into(),
                tokens: 7,
                changed_lines: 12,
            }],
            diff: "--- a/lustre/llite/file.c\n+++ b/lustre/llite/file.c".into(),
            estimated_tokens: 42,
        }
    }

    #[test]
    fn render_orders_sections() {
        let rendered = sample_context().render();
        let refs = rendered.find("# Reference material").unwrap();
        let files = rendered.find("# Changed files").unwrap();
        let diff = rendered.find("# Patch under review").unwrap();
        let task = rendered.find("# Task").unwrap();
        assert!(refs < files && files < diff && diff < task);
    }

    #[test]
    fn render_omits_empty_sections() {
        let mut ctx = sample_context();
        ctx.references.clear();
        ctx.files.clear();
        let rendered = ctx.render();
        assert!(!rendered.contains("# Reference material"));
        assert!(!rendered.contains("# Changed files"));
        assert!(rendered.contains("# Patch under review"));
        assert!(rendered.contains("Review this patch."));
    }

    #[test]
    fn file_paths_in_rank_order() {
        let mut ctx = sample_context();
        ctx.files.push(SelectedFile {
            path: "lustre/llite/namei.c".into(),
            content: String::new(),
            tokens: 0,
            changed_lines: 3,
        });
        assert_eq!(
            ctx.file_paths(),
            vec!["lustre/llite/file.c", "lustre/llite/namei.c"]
        );
    }
}
