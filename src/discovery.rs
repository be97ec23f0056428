//! Commit discovery.
//!
//! Finds the commits a user made in a date range, either through the global
//! commit search index or, when an organization is given, by walking every
//! repository and branch of that organization. Both paths return a list with
//! no duplicate `(repository, sha)` pairs whose fields passed [`sanitize`].

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::github::GhClient;
use crate::progress::ProgressObserver;
use crate::validation::{is_commit_id, sanitize, StatsConfig};

pub mod branches;
pub mod org;
pub mod search;

pub use search::SEARCH_RESULT_CAP;

/// A commit found during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRef {
    /// `owner/name` of the repository holding the commit.
    pub repository: String,
    /// Full 40-character commit id.
    pub sha: String,
    /// Timestamp matching the configured date kind, when the API returned one.
    pub date: Option<DateTime<FixedOffset>>,
}

impl CommitRef {
    /// Builds a commit from untrusted response fields.
    ///
    /// Both identifiers are sanitized. Returns `None` when the repository is
    /// empty or the sha is not a full hex id. An unparseable date becomes `None`.
    pub fn from_response(repository: &str, sha: &str, date: Option<&str>) -> Option<Self> {
        let repository = sanitize(repository);
        let sha = sanitize(sha);
        if repository.is_empty() || !is_commit_id(&sha) {
            return None;
        }
        let date = date.and_then(|d| DateTime::parse_from_rfc3339(d).ok());
        Some(Self {
            repository,
            sha,
            date,
        })
    }

    /// Identity of the commit.
    pub fn key(&self) -> (String, String) {
        (self.repository.clone(), self.sha.clone())
    }
}

/// Which retrieval path produced a [`Discovery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Global commit search index.
    Search,
    /// Repository and branch iteration within an organization.
    Organization,
}

/// Result of commit discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// Deduplicated commits, newest first.
    pub commits: Vec<CommitRef>,
    /// Path that produced the commits.
    pub strategy: Strategy,
    /// True when the search index result cap was reached.
    pub capped: bool,
}

/// Discovers the commits selected by `config`.
///
/// Uses organization iteration when `config.org` is set and the search index
/// otherwise. API failures shorten the result but never fail the call.
pub async fn discover_commits(
    client: &dyn GhClient,
    config: &StatsConfig,
    observer: &mut dyn ProgressObserver,
) -> Discovery {
    match config.org.as_deref() {
        Some(org) => org::iterate_organization(client, config, org, observer).await,
        None => search::search_commits(client, config, observer).await,
    }
}

/// Sorts newest first. Undated commits go last; ties keep their order.
pub(crate) fn sort_newest_first(commits: &mut [CommitRef]) {
    commits.sort_by(|a, b| b.date.cmp(&a.date));
}
