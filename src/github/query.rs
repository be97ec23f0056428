//! Search expressions, REST endpoints and `--jq` projections.
//!
//! Every function here is pure string construction over already validated or
//! sanitized values.

use url::form_urlencoded::byte_serialize;

use super::ApiRequest;
use crate::validation::{DateKind, StatsConfig};

/// Page size used for every paginated listing.
pub const PER_PAGE: u32 = 100;

/// Builds the commit search expression for `config`.
///
/// Terms are joined with `+`, the form-encoded space GitHub search expects.
pub fn build_search_query(config: &StatsConfig) -> String {
    let kind = config.date_kind.as_str();
    let mut terms = vec![
        format!("author:{}", config.user),
        format!(
            "{kind}:{}..{}",
            config.start.format("%Y-%m-%d"),
            config.end.format("%Y-%m-%d")
        ),
    ];
    if let Some(org) = &config.org {
        terms.push(format!("org:{org}"));
    }
    terms.push(format!("sort:{kind}-desc"));
    terms.join("+")
}

/// Requests the total number of matches for a search, as a single integer.
pub fn search_total_request(query: &str) -> ApiRequest {
    ApiRequest::new(format!("search/commits?q={query}&per_page=1")).with_jq(".total_count")
}

/// Requests one page of search results as `{repository, sha, date}` records.
pub fn search_page_request(query: &str, date_kind: DateKind, page: u32) -> ApiRequest {
    ApiRequest::new(format!(
        "search/commits?q={query}&per_page={PER_PAGE}&page={page}"
    ))
    .with_jq(format!(
        ".items[] | {{repository: .repository.full_name, sha: .sha, date: {}}}",
        date_kind.commit_field()
    ))
    .bulk()
}

/// Requests one page of an organization's repositories as `{name, default_branch}` records.
pub fn org_repos_request(org: &str, page: u32) -> ApiRequest {
    ApiRequest::new(format!(
        "orgs/{org}/repos?per_page={PER_PAGE}&page={page}"
    ))
    .with_jq(".[] | {name: .name, default_branch: .default_branch}")
    .bulk()
}

/// Requests one page of a repository's branches as `{name}` records.
pub fn branches_request(repository: &str, page: u32) -> ApiRequest {
    ApiRequest::new(format!(
        "repos/{repository}/branches?per_page={PER_PAGE}&page={page}"
    ))
    .with_jq(".[] | {name: .name}")
    .bulk()
}

/// Requests one page of a branch's history by the configured author and range.
pub fn branch_commits_request(
    repository: &str,
    branch: &str,
    config: &StatsConfig,
    page: u32,
) -> ApiRequest {
    ApiRequest::new(format!(
        "repos/{repository}/commits?sha={}&author={}&since={}&until={}&per_page={PER_PAGE}&page={page}",
        encode(branch),
        encode(&config.user),
        encode(&config.since()),
        encode(&config.until()),
    ))
    .with_jq(format!(
        ".[] | {{sha: .sha, date: {}}}",
        config.date_kind.commit_field()
    ))
    .bulk()
}

/// Requests the additions and deletions of one commit.
pub fn commit_stats_request(repository: &str, sha: &str) -> ApiRequest {
    ApiRequest::new(format!("repos/{repository}/commits/{sha}"))
        .with_jq("{additions: .stats.additions, deletions: .stats.deletions}")
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}
