//! Discovery through the global commit search index.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{CommitRef, Discovery, Strategy};
use crate::github::query::{build_search_query, search_page_request, search_total_request};
use crate::github::{parse_records, GhClient};
use crate::progress::{ProgressEvent, ProgressObserver};
use crate::validation::StatsConfig;

/// Pages the search API will serve for one query.
pub const MAX_SEARCH_PAGES: u32 = 10;

/// Results the search API will serve for one query.
pub const SEARCH_RESULT_CAP: usize = 1000;

#[derive(Debug, Deserialize)]
struct SearchRecord {
    repository: Option<String>,
    sha: Option<String>,
    date: Option<String>,
}

/// Collects search results page by page, newest first.
///
/// Stops at the first page without valid records, once the index estimate is
/// reached, after [`MAX_SEARCH_PAGES`], or when a page cannot be fetched.
pub async fn search_commits(
    client: &dyn GhClient,
    config: &StatsConfig,
    observer: &mut dyn ProgressObserver,
) -> Discovery {
    let query = build_search_query(config);
    debug!(%query, "Searching commits");

    let estimate = fetch_estimate(client, &query).await;
    if let Some(total) = estimate {
        observer.on_event(&ProgressEvent::SearchEstimate { total });
    }

    let mut seen = HashSet::new();
    let mut commits = Vec::new();

    for page in 1..=MAX_SEARCH_PAGES {
        let request = search_page_request(&query, config.date_kind, page);
        let output = match client.api(&request).await {
            Ok(output) => output,
            Err(e) => {
                warn!(page, "Commit search failed, keeping earlier pages: {e:#}");
                break;
            }
        };

        let mut found = 0;
        for record in parse_records::<SearchRecord>(&output) {
            let Some(commit) = CommitRef::from_response(
                record.repository.as_deref().unwrap_or_default(),
                record.sha.as_deref().unwrap_or_default(),
                record.date.as_deref(),
            ) else {
                continue;
            };
            found += 1;
            if seen.insert(commit.key()) {
                commits.push(commit);
            }
        }

        observer.on_event(&ProgressEvent::SearchPage {
            page,
            found,
            accumulated: commits.len(),
            estimate,
        });

        if found == 0 {
            break;
        }
        if estimate.is_some_and(|total| commits.len() as u64 >= total) {
            break;
        }
    }

    let capped = commits.len() >= SEARCH_RESULT_CAP;
    if capped {
        info!(count = commits.len(), "Search result cap reached");
        observer.on_event(&ProgressEvent::Warning {
            message: "search returned the maximum of 1000 commits; \
                      results may be incomplete for this date range",
        });
    }

    Discovery {
        commits,
        strategy: Strategy::Search,
        capped,
    }
}

/// Best-effort match count; `None` only disables the early stop.
async fn fetch_estimate(client: &dyn GhClient, query: &str) -> Option<u64> {
    match client.api(&search_total_request(query)).await {
        Ok(output) => output.trim().parse().ok(),
        Err(e) => {
            debug!("Search estimate unavailable: {e:#}");
            None
        }
    }
}
