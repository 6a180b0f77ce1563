//! Gerrit REST client.
//!
//! All authenticated endpoints live under the `/a/` prefix and use
//! HTTP basic auth. Gerrit prepends `)]}'` to every JSON response to
//! guard against XSSI; [`strip_xssi`] removes it before parsing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::GerritConfig;

use super::url::ChangeRef;
use super::GerritError;

/// Fetch protocols in preference order for checkout.
const FETCH_PROTOCOLS: &[&str] = &["anonymous http", "http", "ssh"];

/// Change metadata returned by the changes endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeInfo {
    pub id: String,
    #[serde(rename = "_number")]
    pub number: u64,
    pub subject: String,
    pub branch: String,
    pub current_revision: Option<String>,
    #[serde(default)]
    pub revisions: HashMap<String, RevisionInfo>,
}

/// Per-revision metadata (only the fetch info is used).
#[derive(Debug, Clone, Deserialize)]
pub struct RevisionInfo {
    #[serde(default)]
    pub fetch: HashMap<String, FetchInfo>,
}

/// Where a revision can be fetched from.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchInfo {
    pub url: String,
    #[serde(rename = "ref")]
    pub refspec: String,
}

/// Resolved `git fetch` source for a change revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSource {
    pub url: String,
    pub refspec: String,
}

/// Review comment payload.
#[derive(Debug, Serialize)]
struct ReviewInput<'a> {
    message: &'a str,
    notify: &'a str,
}

/// Client for the Gerrit REST API.
pub struct GerritClient {
    http: reqwest::Client,
    config: GerritConfig,
}

impl GerritClient {
    pub fn new(config: GerritConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Perform an authenticated GET and return the XSSI-stripped body.
    async fn get(&self, path: &str) -> Result<String, GerritError> {
        let url = format!("{}/a{path}", self.config.url);
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.config.auth.username, Some(&self.config.auth.password))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GerritError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(strip_xssi(&body).to_string())
    }

    /// Test the connection by querying the server version.
    pub async fn test_connection(&self) -> Result<String, GerritError> {
        let body = self.get("/config/server/version").await?;
        let version: String =
            serde_json::from_str(&body).map_err(|e| GerritError::Parse(e.to_string()))?;
        Ok(version)
    }

    /// Look up a change by number or full change id.
    ///
    /// Numbers are globally unique; full change ids are qualified with
    /// the configured project and branch.
    pub async fn get_change(&self, change: &ChangeRef) -> Result<ChangeInfo, GerritError> {
        let options = "o=CURRENT_REVISION&o=CURRENT_COMMIT&o=CURRENT_FILES";
        let path = if change.id.chars().all(|c| c.is_ascii_digit()) {
            format!("/changes/{}?{options}", change.id)
        } else {
            format!(
                "/changes/{}~{}~{}?{options}",
                urlencoding::encode(&self.config.project),
                urlencoding::encode(&self.config.branch),
                change.id,
            )
        };

        let body = match self.get(&path).await {
            Ok(body) => body,
            Err(GerritError::Api { status: 404, .. }) => {
                return Err(GerritError::NotFound(change.id.clone()));
            }
            Err(e) => return Err(e),
        };

        serde_json::from_str(&body).map_err(|e| GerritError::Parse(e.to_string()))
    }

    /// Resolve where to `git fetch` the change's current revision from.
    ///
    /// Prefers anonymous HTTP, then authenticated HTTP, then SSH. When
    /// `patchset` is given, the trailing patchset component of the ref
    /// is rewritten to target that specific version.
    pub fn checkout_source(
        &self,
        change: &ChangeInfo,
        patchset: Option<u32>,
    ) -> Result<CheckoutSource, GerritError> {
        let revision = change
            .current_revision
            .as_deref()
            .ok_or(GerritError::MissingRevision)?;
        let fetch = change
            .revisions
            .get(revision)
            .map(|r| &r.fetch)
            .ok_or(GerritError::NoFetchInfo)?;

        for protocol in FETCH_PROTOCOLS {
            if let Some(info) = fetch.get(*protocol) {
                let refspec = match patchset {
                    Some(ps) => rewrite_patchset(&info.refspec, ps),
                    None => info.refspec.clone(),
                };
                return Ok(CheckoutSource {
                    url: info.url.clone(),
                    refspec,
                });
            }
        }

        Err(GerritError::NoFetchInfo)
    }

    /// Post a review comment on the change's current revision.
    pub async fn post_review(
        &self,
        change: &ChangeInfo,
        message: &str,
    ) -> Result<(), GerritError> {
        let revision = change
            .current_revision
            .as_deref()
            .ok_or(GerritError::MissingRevision)?;

        // `change.id` comes back from the API already URL-encoded
        // (e.g. `fs%2Flustre-release~master~I...`), so it is used as-is.
        let url = format!(
            "{}/a/changes/{}/revisions/{}/review",
            self.config.url, change.id, revision,
        );

        let payload = ReviewInput {
            message,
            notify: "OWNER",
        };

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.auth.username, Some(&self.config.auth.password))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "<no body>".into());
            return Err(GerritError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Strip Gerrit's `)]}'` XSSI guard prefix.
fn strip_xssi(body: &str) -> &str {
    body.strip_prefix(")]}'")
        .map(|rest| rest.trim_start_matches(['\r', '\n']))
        .unwrap_or(body)
}

/// Replace the trailing patchset component of a change ref.
///
/// `refs/changes/05/59005/2` with patchset 3 becomes
/// `refs/changes/05/59005/3`.
fn rewrite_patchset(refspec: &str, patchset: u32) -> String {
    match refspec.rsplit_once('/') {
        Some((prefix, last)) if last.chars().all(|c| c.is_ascii_digit()) => {
            format!("{prefix}/{patchset}")
        }
        _ => refspec.to_string(),
    }
}
