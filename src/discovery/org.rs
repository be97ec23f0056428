//! Discovery by iterating an organization's repositories and branches.
//!
//! Used instead of the search index when an organization is given, because
//! the index does not cover every branch. Each repository, branch and page is
//! fetched sequentially; a failure only truncates that unit's contribution.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, warn};

use super::branches::repository_branches;
use super::{sort_newest_first, CommitRef, Discovery, Strategy};
use crate::github::query::{branch_commits_request, org_repos_request, PER_PAGE};
use crate::github::{parse_records, GhClient};
use crate::progress::{ProgressEvent, ProgressObserver};
use crate::validation::{sanitize, DateKind, StatsConfig};

/// Repositories listed per organization at most.
pub const MAX_REPOSITORIES: usize = 1000;

/// History pages fetched per branch at most.
pub const MAX_COMMIT_PAGES: u32 = 10;

#[derive(Debug, Deserialize)]
struct RepositoryRecord {
    name: Option<String>,
    default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BranchCommitRecord {
    sha: Option<String>,
    date: Option<String>,
}

/// A repository found in the organization listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgRepository {
    /// `owner/name`.
    pub full_name: String,
    /// Default branch, when the listing reported one.
    pub default_branch: Option<String>,
}

/// Walks every repository of `org` and collects the configured user's commits.
pub async fn iterate_organization(
    client: &dyn GhClient,
    config: &StatsConfig,
    org: &str,
    observer: &mut dyn ProgressObserver,
) -> Discovery {
    let repositories = list_repositories(client, org).await;
    observer.on_event(&ProgressEvent::RepositoriesListed {
        count: repositories.len(),
    });

    let mut seen = HashSet::new();
    let mut commits = Vec::new();

    for (index, repository) in repositories.iter().enumerate() {
        observer.on_event(&ProgressEvent::RepositoryStarted {
            index: index + 1,
            total: repositories.len(),
            repository: &repository.full_name,
        });

        for commit in scan_repository(client, config, repository, observer).await {
            if seen.insert(commit.sha.clone()) {
                commits.push(commit);
            }
        }
    }

    sort_newest_first(&mut commits);

    Discovery {
        commits,
        strategy: Strategy::Organization,
        capped: false,
    }
}

/// Lists the repositories of `org`, up to [`MAX_REPOSITORIES`].
///
/// A failing page ends the listing; repositories from earlier pages are kept.
pub async fn list_repositories(client: &dyn GhClient, org: &str) -> Vec<OrgRepository> {
    let mut repositories = Vec::new();
    let max_pages = MAX_REPOSITORIES.div_ceil(PER_PAGE as usize) as u32;

    for page in 1..=max_pages {
        let output = match client.api(&org_repos_request(org, page)).await {
            Ok(output) => output,
            Err(e) => {
                warn!(org, page, "Repository listing failed: {e:#}");
                break;
            }
        };

        let records: Vec<RepositoryRecord> = parse_records(&output);
        for record in &records {
            let name = sanitize(record.name.as_deref().unwrap_or_default());
            if name.is_empty() {
                continue;
            }
            let default_branch = record
                .default_branch
                .as_deref()
                .map(sanitize)
                .filter(|b| !b.is_empty());
            repositories.push(OrgRepository {
                full_name: format!("{org}/{name}"),
                default_branch,
            });
        }

        if repositories.len() >= MAX_REPOSITORIES {
            repositories.truncate(MAX_REPOSITORIES);
            break;
        }
        if records.len() < PER_PAGE as usize {
            break;
        }
    }

    debug!(org, count = repositories.len(), "Listed repositories");
    repositories
}

/// Collects the user's commits on every selected branch of one repository.
///
/// A commit reachable from several branches is kept once, from the first
/// branch that returned it.
pub async fn scan_repository(
    client: &dyn GhClient,
    config: &StatsConfig,
    repository: &OrgRepository,
    observer: &mut dyn ProgressObserver,
) -> Vec<CommitRef> {
    let branches = repository_branches(
        client,
        &repository.full_name,
        repository.default_branch.as_deref(),
    )
    .await;
    if branches.is_empty() {
        warn!(repository = %repository.full_name, "No branches to scan");
    }

    let mut seen = HashSet::new();
    let mut commits = Vec::new();

    for branch in &branches {
        let found = scan_branch(
            client,
            config,
            &repository.full_name,
            branch,
            &mut seen,
            &mut commits,
        )
        .await;
        observer.on_event(&ProgressEvent::BranchScanned {
            repository: &repository.full_name,
            branch,
            found,
        });
    }

    commits
}

/// Pages through one branch's history; returns how many new commits it added.
async fn scan_branch(
    client: &dyn GhClient,
    config: &StatsConfig,
    repository: &str,
    branch: &str,
    seen: &mut HashSet<String>,
    commits: &mut Vec<CommitRef>,
) -> usize {
    let mut found = 0;

    for page in 1..=MAX_COMMIT_PAGES {
        let request = branch_commits_request(repository, branch, config, page);
        let output = match client.api(&request).await {
            Ok(output) => output,
            Err(e) => {
                warn!(repository, branch, page, "Commit history failed: {e:#}");
                break;
            }
        };

        let records: Vec<BranchCommitRecord> = parse_records(&output);
        for record in &records {
            let Some(commit) = CommitRef::from_response(
                repository,
                record.sha.as_deref().unwrap_or_default(),
                record.date.as_deref(),
            ) else {
                continue;
            };
            // `since`/`until` only filter on committer time.
            if config.date_kind == DateKind::AuthorDate
                && commit.date.is_some_and(|date| !config.covers(&date))
            {
                continue;
            }
            if seen.insert(commit.sha.clone()) {
                commits.push(commit);
                found += 1;
            }
        }

        if records.len() < PER_PAGE as usize {
            break;
        }
    }

    found
}
