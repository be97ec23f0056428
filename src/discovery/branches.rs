//! Branch selection for organization iteration.

use std::collections::HashSet;
use std::sync::LazyLock;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use tracing::warn;

use crate::github::query::{branches_request, PER_PAGE};
use crate::github::{parse_records, GhClient};
use crate::validation::sanitize;

/// Branches taken from the listing in addition to the default branch.
pub const MAX_EXTRA_BRANCHES: usize = 100;

/// Listing pages fetched before giving up on filling [`MAX_EXTRA_BRANCHES`].
const MAX_BRANCH_PAGES: u32 = 10;

/// Branch names scanned before all others.
const PRIMARY_EXACT: &[&str] = &[
    "main",
    "master",
    "trunk",
    "develop",
    "development",
    "dev",
    "release",
    "staging",
    "stage",
    "qa",
    "uat",
    "prod",
    "production",
];

/// Prefixes of long-lived integration branches.
const PRIMARY_PREFIXES: &[&str] = &[
    "release/",
    "release-",
    "releases/",
    "hotfix/",
    "hotfix-",
    "staging/",
    "staging-",
    "qa/",
    "qa-",
    "uat/",
    "prod/",
    "production/",
];

/// Suffixes of long-lived integration branches.
const PRIMARY_SUFFIXES: &[&str] = &["-release", "-staging", "-qa", "-prod", "-main", "-stable"];

#[allow(clippy::unwrap_used)] // Compile-time constant glob patterns
static PRIMARY_BRANCHES: LazyLock<GlobSet> = LazyLock::new(|| {
    let patterns = PRIMARY_EXACT
        .iter()
        .map(|name| (*name).to_string())
        .chain(PRIMARY_PREFIXES.iter().map(|prefix| format!("{prefix}*")))
        .chain(PRIMARY_SUFFIXES.iter().map(|suffix| format!("*{suffix}")));

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(
            GlobBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .unwrap(),
        );
    }
    builder.build().unwrap()
});

#[derive(Debug, Deserialize)]
struct BranchRecord {
    name: Option<String>,
}

/// Returns true for trunk, release, staging and QA style branch names.
pub fn is_primary_branch(name: &str) -> bool {
    PRIMARY_BRANCHES.is_match(name)
}

/// Orders the branches of one repository for scanning.
///
/// The default branch comes first. Up to [`MAX_EXTRA_BRANCHES`] distinct
/// listed branches follow, primary ones before the rest, each group in
/// listing order.
pub fn order_branches<I>(default_branch: Option<&str>, listed: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();

    if let Some(default_branch) = default_branch.filter(|b| !b.is_empty()) {
        seen.insert(default_branch.to_string());
        ordered.push(default_branch.to_string());
    }

    let extras: Vec<String> = listed
        .into_iter()
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .take(MAX_EXTRA_BRANCHES)
        .collect();

    let (primary, rest): (Vec<String>, Vec<String>) =
        extras.into_iter().partition(|name| is_primary_branch(name));

    ordered.extend(primary);
    ordered.extend(rest);
    ordered
}

/// Lists and orders the branches of `repository`.
///
/// A failing listing leaves only the default branch.
pub async fn repository_branches(
    client: &dyn GhClient,
    repository: &str,
    default_branch: Option<&str>,
) -> Vec<String> {
    let mut listed = Vec::new();
    let mut distinct = HashSet::new();

    for page in 1..=MAX_BRANCH_PAGES {
        let output = match client.api(&branches_request(repository, page)).await {
            Ok(output) => output,
            Err(e) => {
                warn!(repository, page, "Branch listing failed: {e:#}");
                break;
            }
        };

        let records: Vec<BranchRecord> = parse_records(&output);
        for name in records.iter().filter_map(|r| r.name.as_deref()).map(sanitize) {
            distinct.insert(name.clone());
            listed.push(name);
        }

        if records.len() < PER_PAGE as usize || distinct.len() > MAX_EXTRA_BRANCHES {
            break;
        }
    }

    order_branches(default_branch, listed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::github::test_utils::ScriptedGhClient;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn primary_matches_exact_prefix_and_suffix() {
        for name in ["main", "Master", "release/2.1", "hotfix-login", "eu-staging", "v2-stable"] {
            assert!(is_primary_branch(name), "{name} should be primary");
        }
        for name in ["feature/login", "mainline-docs", "alice/qa-notes", "releasenotes"] {
            assert!(!is_primary_branch(name), "{name} should not be primary");
        }
    }

    #[test]
    fn order_puts_default_then_primary_then_rest() {
        let listed = names(&["feature/a", "release/1.0", "main", "fix/b", "develop"]);
        assert_eq!(
            order_branches(Some("main"), listed),
            names(&["main", "release/1.0", "develop", "feature/a", "fix/b"])
        );
    }

    #[test]
    fn order_suppresses_duplicates() {
        let listed = names(&["a", "b", "a", "trunk", "b", "trunk"]);
        assert_eq!(
            order_branches(Some("dev"), listed),
            names(&["dev", "trunk", "a", "b"])
        );
    }

    #[test]
    fn order_caps_extra_branches() {
        let listed: Vec<String> = (0..150).map(|i| format!("topic-{i}")).collect();
        let ordered = order_branches(Some("main"), listed);
        assert_eq!(ordered.len(), MAX_EXTRA_BRANCHES + 1);
        assert_eq!(ordered[0], "main");
        assert_eq!(ordered[MAX_EXTRA_BRANCHES], "topic-99");
    }

    #[test]
    fn order_without_default_branch() {
        let listed = names(&["feature/x", "qa"]);
        assert_eq!(order_branches(None, listed), names(&["qa", "feature/x"]));
    }

    #[tokio::test]
    async fn listing_failure_keeps_default_branch() {
        let client = ScriptedGhClient::new().fail("repos/acme/api/branches?per_page=100&page=1", "404");
        let branches = repository_branches(&client, "acme/api", Some("main")).await;
        assert_eq!(branches, names(&["main"]));
    }

    #[tokio::test]
    async fn listing_sanitizes_names() {
        let client = ScriptedGhClient::new().respond(
            "repos/acme/api/branches?per_page=100&page=1",
            "{\"name\":\"main\"}\n{\"name\":\"feat/$(rm)x\"}\n{\"name\":\"release/1\"}\n",
        );
        let branches = repository_branches(&client, "acme/api", Some("main")).await;
        assert_eq!(branches, names(&["main", "release/1", "feat/rmx"]));
        assert_eq!(client.call_count(), 1);
    }

    fn branch_page(names: impl IntoIterator<Item = String>) -> String {
        names
            .into_iter()
            .map(|name| format!("{{\"name\":\"{name}\"}}\n"))
            .collect()
    }

    fn page_endpoint(page: u32) -> String {
        format!("repos/acme/api/branches?per_page=100&page={page}")
    }

    #[tokio::test]
    async fn listing_dedups_across_pages() {
        // Page 1: b0..b59 plus repeats of b0..b39, a full page of 100.
        let first = branch_page((0..60).chain(0..40).map(|i| format!("b{i}")));
        // Page 2: b40..b89, short, so listing ends here.
        let second = branch_page((40..90).map(|i| format!("b{i}")));
        let client = ScriptedGhClient::new()
            .respond(page_endpoint(1), first)
            .respond(page_endpoint(2), second);

        let branches = repository_branches(&client, "acme/api", Some("main")).await;

        let expected: Vec<String> = std::iter::once("main".to_string())
            .chain((0..90).map(|i| format!("b{i}")))
            .collect();
        assert_eq!(branches, expected);
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn listing_stops_once_enough_branches_are_known() {
        let client = ScriptedGhClient::new()
            .respond(page_endpoint(1), branch_page((0..100).map(|i| format!("x{i}"))))
            .respond(page_endpoint(2), branch_page((0..100).map(|i| format!("y{i}"))))
            .respond(page_endpoint(3), branch_page((0..100).map(|i| format!("z{i}"))));

        let branches = repository_branches(&client, "acme/api", Some("main")).await;

        assert_eq!(client.call_count(), 2);
        assert_eq!(branches.len(), MAX_EXTRA_BRANCHES + 1);
        assert_eq!(branches[1], "x0");
        assert_eq!(branches[MAX_EXTRA_BRANCHES], "x99");
    }
}
