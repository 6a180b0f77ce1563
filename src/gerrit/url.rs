//! Change reference parsing.
//!
//! Operators paste change references in whatever form their browser
//! gives them. Accepted forms:
//!
//! - `59005` (change number)
//! - `I1234567890abcdef...` (full change id)
//! - `https://review.example.org/59005`
//! - `https://review.example.org/c/fs/lustre-release/+/59005`
//! - `https://review.example.org/c/fs/lustre-release/+/59005/3` (patchset)
//! - `https://review.example.org/#/c/59005/`
//! - `https://review.example.org/q/59005`

use std::sync::OnceLock;

use regex::Regex;

/// A parsed change reference: the id (number or full change id) plus
/// an optional explicit patchset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRef {
    pub id: String,
    pub patchset: Option<u32>,
}

impl ChangeRef {
    fn bare(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            patchset: None,
        }
    }
}

fn plus_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/\+/(\d+)(?:/(\d+))?/?$").unwrap())
}

fn hash_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#/c/(\d+)(?:/(\d+))?/?$").unwrap())
}

fn trailing_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/(\d+)/?$").unwrap())
}

/// Parse a change reference from user input.
///
/// Non-URL input is passed through untouched (it is already a change
/// number or id). URLs that cannot be parsed are also passed through
/// so the subsequent API lookup fails with a clear message instead of
/// this function guessing.
pub fn parse_change_ref(input: &str) -> ChangeRef {
    let input = input.trim();

    if !input.starts_with("http") {
        return ChangeRef::bare(input);
    }

    // Drop query parameters before matching.
    let url = input.split('?').next().unwrap_or(input);

    if let Some(caps) = plus_re().captures(url) {
        return ChangeRef {
            id: caps[1].to_string(),
            patchset: caps.get(2).and_then(|m| m.as_str().parse().ok()),
        };
    }

    if let Some(caps) = hash_re().captures(url) {
        return ChangeRef {
            id: caps[1].to_string(),
            patchset: caps.get(2).and_then(|m| m.as_str().parse().ok()),
        };
    }

    // Covers both `https://host/59005` and `https://host/q/59005`.
    if let Some(caps) = trailing_number_re().captures(url) {
        return ChangeRef::bare(&caps[1]);
    }

    ChangeRef::bare(input)
}
