//! Gerrit REST API integration: change lookup, checkout-source
//! resolution, and review comment posting.

pub mod client;
pub mod url;

use thiserror::Error;

pub use client::{ChangeInfo, CheckoutSource, GerritClient};
pub use url::{parse_change_ref, ChangeRef};

/// Errors from the Gerrit boundary.
#[derive(Error, Debug)]
pub enum GerritError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gerrit API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("change not found: {0}")]
    NotFound(String),

    #[error("change has no current revision")]
    MissingRevision,

    #[error("no usable fetch info on the current revision")]
    NoFetchInfo,

    #[error("failed to parse Gerrit response: {0}")]
    Parse(String),
}
