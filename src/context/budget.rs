//! Pure context-budget planning.
//!
//! Decides which changed files fit into the review context under the
//! configured token budget. No I/O happens here: the caller loads all
//! text up front and this module only selects, which keeps the
//! procedure unit-testable and deterministic.

use thiserror::Error;

/// Budget planning errors.
#[derive(Error, Debug)]
pub enum BudgetError {
    /// The mandatory instruction + reference material alone does not
    /// fit. Reference documents are never truncated, so this is a
    /// configuration problem.
    #[error(
        "instruction and reference documents need {needed} tokens but the budget is {budget}; \
         reduce reference material or raise review.max_tokens"
    )]
    ReferencesExceedBudget { needed: usize, budget: usize },
}

/// Estimate the token cost of a piece of text.
///
/// One token per four bytes, rounded up. Intentionally crude: the
/// point is a deterministic, tokenizer-independent bound that tracks
/// content size, not parity with any particular model's tokenizer.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// A changed file that is a candidate for inclusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    /// Path relative to the repository root.
    pub path: String,
    /// Total changed lines (ranking key, descending).
    pub changed_lines: u64,
    /// Estimated token cost of the file's full content.
    pub tokens: usize,
}

/// The outcome of budget planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextPlan {
    /// Whether the reference documents fit. When `false` the context
    /// falls back to instruction + diff only.
    pub include_references: bool,
    /// Paths of the selected files, in inclusion order.
    pub selected: Vec<String>,
    /// Estimated total token cost of the planned context.
    pub estimated_tokens: usize,
}

/// Plan which files to include under the token budget.
///
/// 1. Instruction + references must fit on their own, or planning
///    fails. Guidance material is never silently truncated.
/// 2. The diff is always included. If instruction + references + diff
///    exceed the budget, references are dropped and the context is
///    instruction + diff only.
/// 3. Candidates are ranked by changed lines descending (ties by
///    lexical path order) with ignore-listed paths removed, then added
///    greedily until the file cap or the first candidate that does not
///    fit the remaining budget. No skip-ahead: selection stops at the
///    first file that overflows.
///
/// Zero selected files is a valid outcome, not an error.
pub fn plan_context(
    instruction_tokens: usize,
    reference_tokens: usize,
    diff_tokens: usize,
    candidates: &[FileCandidate],
    ignored_dirs: &[String],
    budget: usize,
    max_files: usize,
) -> Result<ContextPlan, BudgetError> {
    let mandatory = instruction_tokens + reference_tokens;
    if mandatory > budget {
        return Err(BudgetError::ReferencesExceedBudget {
            needed: mandatory,
            budget,
        });
    }

    let reserved = mandatory + diff_tokens;
    if reserved > budget {
        // Last resort: instruction + diff only.
        return Ok(ContextPlan {
            include_references: false,
            selected: Vec::new(),
            estimated_tokens: instruction_tokens + diff_tokens,
        });
    }

    let mut ranked: Vec<&FileCandidate> = candidates
        .iter()
        .filter(|c| !is_ignored(&c.path, ignored_dirs))
        .collect();
    ranked.sort_by(|a, b| {
        b.changed_lines
            .cmp(&a.changed_lines)
            .then_with(|| a.path.cmp(&b.path))
    });

    let mut remaining = budget - reserved;
    let mut selected = Vec::new();
    let mut used = reserved;

    for candidate in ranked {
        if selected.len() >= max_files {
            break;
        }
        if candidate.tokens > remaining {
            break;
        }
        remaining -= candidate.tokens;
        used += candidate.tokens;
        selected.push(candidate.path.clone());
    }

    Ok(ContextPlan {
        include_references: true,
        selected,
        estimated_tokens: used,
    })
}

/// Whether a path falls under any ignore-listed directory.
///
/// Matches on component boundaries: `lustre/tests` covers
/// `lustre/tests/sanity.sh` but not `lustre/tests_extra/foo.c`.
pub fn is_ignored(path: &str, ignored_dirs: &[String]) -> bool {
    ignored_dirs.iter().any(|dir| {
        let dir = dir.trim_end_matches('/');
        path == dir || path.starts_with(&format!("{dir}/"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn candidate(path: &str, changed_lines: u64, tokens: usize) -> FileCandidate {
        FileCandidate {
            path: path.to_string(),
            changed_lines,
            tokens,
        }
    }

    #[test]
    fn estimate_tokens_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn references_exceeding_budget_is_config_error() {
        let result = plan_context(100, 950, 10, &[], &[], 1000, 3);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("1050"));
        assert!(err.to_string().contains("1000"));
    }

    #[test]
    fn oversized_diff_falls_back_to_instruction_plus_diff() {
        let candidates = vec![candidate("a.c", 100, 10)];
        let plan = plan_context(50, 100, 900, &candidates, &[], 1000, 3).unwrap();
        assert!(!plan.include_references);
        assert!(plan.selected.is_empty());
        assert_eq!(plan.estimated_tokens, 950);
    }

    #[test]
    fn greedy_selects_most_changed_first() {
        let candidates = vec![
            candidate("small.c", 5, 100),
            candidate("big.c", 500, 200),
            candidate("medium.c", 50, 150),
        ];
        let plan = plan_context(10, 10, 10, &candidates, &[], 1000, 3).unwrap();
        assert_eq!(plan.selected, vec!["big.c", "medium.c", "small.c"]);
    }

    #[test]
    fn stops_at_first_file_that_does_not_fit() {
        // Headroom after reservation is 700, so A (600) fits, B (500)
        // does not, and C (100) is never reached.
        let candidates = vec![
            candidate("a.c", 300, 600),
            candidate("b.c", 200, 500),
            candidate("c.c", 100, 100),
        ];
        let plan = plan_context(100, 100, 100, &candidates, &[], 1000, 3).unwrap();
        assert_eq!(plan.selected, vec!["a.c"]);
        assert_eq!(plan.estimated_tokens, 900);
    }

    #[test]
    fn max_files_caps_selection() {
        let candidates = vec![
            candidate("a.c", 40, 1),
            candidate("b.c", 30, 1),
            candidate("c.c", 20, 1),
            candidate("d.c", 10, 1),
        ];
        let plan = plan_context(1, 1, 1, &candidates, &[], 1000, 2).unwrap();
        assert_eq!(plan.selected, vec!["a.c", "b.c"]);
    }

    #[test]
    fn ties_break_by_lexical_path_order() {
        let candidates = vec![
            candidate("zeta.c", 10, 1),
            candidate("alpha.c", 10, 1),
            candidate("mid.c", 10, 1),
        ];
        let plan = plan_context(1, 1, 1, &candidates, &[], 1000, 3).unwrap();
        assert_eq!(plan.selected, vec!["alpha.c", "mid.c", "zeta.c"]);
    }

    #[test]
    fn ignored_dirs_are_never_selected() {
        let candidates = vec![
            candidate("lustre/tests/sanity.sh", 9999, 1),
            candidate("lustre/llite/file.c", 10, 1),
        ];
        let ignored = vec!["lustre/tests".to_string()];
        let plan = plan_context(1, 1, 1, &candidates, &ignored, 1000, 3).unwrap();
        assert_eq!(plan.selected, vec!["lustre/llite/file.c"]);
    }

    #[test]
    fn ignore_matches_component_boundary_only() {
        assert!(is_ignored("lustre/tests/sanity.sh", &["lustre/tests".into()]));
        assert!(is_ignored("lustre/tests", &["lustre/tests".into()]));
        assert!(is_ignored("lustre/tests/a/b.c", &["lustre/tests/".into()]));
        assert!(!is_ignored(
            "lustre/tests_extra/foo.c",
            &["lustre/tests".into()]
        ));
        assert!(!is_ignored("other/lustre/tests/x.c", &["lustre/tests".into()]));
    }

    #[test]
    fn zero_candidates_is_success() {
        let plan = plan_context(10, 10, 10, &[], &[], 1000, 3).unwrap();
        assert!(plan.include_references);
        assert!(plan.selected.is_empty());
        assert_eq!(plan.estimated_tokens, 30);
    }

    #[test]
    fn all_candidates_ignored_is_success() {
        let candidates = vec![candidate("lustre/tests/t.sh", 100, 10)];
        let ignored = vec!["lustre/tests".to_string()];
        let plan = plan_context(10, 10, 10, &candidates, &ignored, 1000, 3).unwrap();
        assert!(plan.selected.is_empty());
    }

    #[test]
    fn plan_never_exceeds_budget() {
        // Sweep a grid of shapes and check the invariant holds.
        let candidates = vec![
            candidate("a.c", 90, 301),
            candidate("b.c", 80, 227),
            candidate("c.c", 70, 199),
            candidate("d.c", 60, 83),
            candidate("e.c", 50, 41),
        ];
        for budget in [100usize, 500, 750, 1000, 2000] {
            for max_files in 0..=5 {
                let result = plan_context(30, 40, 50, &candidates, &[], budget, max_files);
                if let Ok(plan) = result {
                    assert!(
                        plan.estimated_tokens <= budget,
                        "budget {budget} max_files {max_files}: \
                         planned {} tokens",
                        plan.estimated_tokens
                    );
                }
            }
        }
    }

    #[test]
    fn planning_is_deterministic() {
        let candidates = vec![
            candidate("b.c", 10, 50),
            candidate("a.c", 10, 50),
            candidate("c.c", 20, 50),
        ];
        let first = plan_context(10, 10, 10, &candidates, &[], 500, 3).unwrap();
        for _ in 0..10 {
            let again = plan_context(10, 10, 10, &candidates, &[], 500, 3).unwrap();
            assert_eq!(first, again);
        }
    }
}
