//! Per-commit line statistics and their aggregation.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::discovery::CommitRef;
use crate::github::query::commit_stats_request;
use crate::github::GhClient;
use crate::progress::{ProgressEvent, ProgressObserver};

/// Lines added and removed by one commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsEntry {
    /// Lines added.
    pub additions: u64,
    /// Lines removed.
    pub deletions: u64,
}

impl StatsEntry {
    /// Parses the projected `{additions, deletions}` object.
    ///
    /// Missing, negative or non-numeric fields count as zero. Numeric strings
    /// are accepted.
    pub fn from_json(output: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(output.trim()).context("Failed to parse commit stats JSON")?;
        Ok(Self {
            additions: coerce_count(value.get("additions")),
            deletions: coerce_count(value.get("deletions")),
        })
    }
}

fn coerce_count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Fetches the line statistics of one commit.
pub async fn fetch_commit_stats(client: &dyn GhClient, commit: &CommitRef) -> Result<StatsEntry> {
    let request = commit_stats_request(&commit.repository, &commit.sha);
    let output = client
        .api(&request)
        .await
        .with_context(|| format!("Failed to fetch stats for {}@{}", commit.repository, commit.sha))?;
    StatsEntry::from_json(&output)
}

/// Summed statistics of one repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepoAggregate {
    /// Distinct commits counted.
    pub commit_count: u64,
    /// Lines added across those commits.
    pub additions: u64,
    /// Lines removed across those commits.
    pub deletions: u64,
}

impl RepoAggregate {
    /// Lines changed in total; always `additions + deletions`.
    pub fn total(&self) -> u64 {
        self.additions + self.deletions
    }

    /// Adds one commit's statistics.
    pub fn add(&mut self, entry: StatsEntry) {
        self.commit_count += 1;
        self.additions += entry.additions;
        self.deletions += entry.deletions;
    }
}

/// Aggregated statistics for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateReport {
    /// Per-repository sums keyed by `owner/name`.
    pub repositories: BTreeMap<String, RepoAggregate>,
    /// Commits counted across all repositories.
    pub total_commits: u64,
    /// Lines added across all repositories.
    pub total_additions: u64,
    /// Lines removed across all repositories.
    pub total_deletions: u64,
}

impl AggregateReport {
    /// Lines changed across all repositories.
    pub fn total_changes(&self) -> u64 {
        self.total_additions + self.total_deletions
    }

    /// Records one commit of `repository`.
    pub fn record(&mut self, repository: &str, entry: StatsEntry) {
        self.repositories
            .entry(repository.to_string())
            .or_default()
            .add(entry);
        self.total_commits += 1;
        self.total_additions += entry.additions;
        self.total_deletions += entry.deletions;
    }

    /// Repositories ordered by total lines changed, largest first, then by name.
    pub fn ranked(&self) -> Vec<(&str, &RepoAggregate)> {
        let mut rows: Vec<(&str, &RepoAggregate)> = self
            .repositories
            .iter()
            .map(|(name, aggregate)| (name.as_str(), aggregate))
            .collect();
        rows.sort_by(|a, b| b.1.total().cmp(&a.1.total()).then_with(|| a.0.cmp(b.0)));
        rows
    }
}

/// Groups commits by repository, with each sha at most once per repository.
pub fn group_by_repository(commits: &[CommitRef]) -> BTreeMap<&str, BTreeSet<&str>> {
    let mut groups: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for commit in commits {
        groups
            .entry(commit.repository.as_str())
            .or_default()
            .insert(commit.sha.as_str());
    }
    groups
}

/// Fetches stats for every commit and sums them per repository and overall.
///
/// A commit whose stats cannot be fetched counts with zero lines.
pub async fn aggregate(
    client: &dyn GhClient,
    commits: &[CommitRef],
    observer: &mut dyn ProgressObserver,
) -> AggregateReport {
    let groups = group_by_repository(commits);
    let total: usize = groups.values().map(BTreeSet::len).sum();
    let mut report = AggregateReport::default();
    let mut done = 0;

    for (repository, shas) in groups {
        for sha in shas {
            let commit = CommitRef {
                repository: repository.to_string(),
                sha: sha.to_string(),
                date: None,
            };
            let entry = fetch_commit_stats(client, &commit)
                .await
                .unwrap_or_default();
            report.record(repository, entry);

            done += 1;
            observer.on_event(&ProgressEvent::StatsFetched { done, total });
        }
    }

    report
}
