//! Review result types.

use super::ReviewType;

/// The free-form text produced by one assistant invocation.
///
/// The destination (local file vs. Gerrit comment thread) is owned by
/// the driver that requested the review, not by the result itself.
#[derive(Debug, Clone)]
pub struct ReviewResult {
    /// Which review produced this text.
    pub kind: ReviewType,
    /// The assistant's review, verbatim.
    pub text: String,
}
