//! Rendering of aggregated statistics.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use crate::discovery::{Discovery, Strategy, SEARCH_RESULT_CAP};
use crate::stats::AggregateReport;
use crate::validation::{DateKind, StatsConfig};

const HEADERS: [&str; 5] = ["Repository", "Commits", "Added", "Removed", "Total"];

/// What the report is about, for the header and JSON metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    /// GitHub login.
    pub user: String,
    /// Organization filter, if any.
    pub org: Option<String>,
    /// First day of the range.
    pub start: NaiveDate,
    /// Last day of the range.
    pub end: NaiveDate,
    /// Timestamp used for the range.
    pub date_kind: DateKind,
    /// Discovery path that produced the commits.
    pub strategy: Strategy,
    /// Whether the search result cap was hit.
    pub capped: bool,
}

impl ReportContext {
    /// Combines the run configuration with the discovery outcome.
    pub fn new(config: &StatsConfig, discovery: &Discovery) -> Self {
        Self {
            user: config.user.clone(),
            org: config.org.clone(),
            start: config.start,
            end: config.end,
            date_kind: config.date_kind,
            strategy: discovery.strategy,
            capped: discovery.capped,
        }
    }
}

/// Renders the plain-text report: header, ranked table and summary.
pub fn render_table(report: &AggregateReport, context: &ReportContext) -> String {
    let mut out = String::new();

    out.push_str(&format!("Commit statistics for {}\n", context.user));
    out.push_str(&format!(
        "Range: {}..{} ({})\n",
        context.start.format("%Y-%m-%d"),
        context.end.format("%Y-%m-%d"),
        context.date_kind
    ));
    match &context.org {
        Some(org) => out.push_str(&format!("Organization: {org}\n")),
        None => out.push_str("Organization: (all)\n"),
    }
    out.push('\n');

    if report.repositories.is_empty() {
        out.push_str("No commits found.\n");
    } else {
        let rows: Vec<[String; 5]> = report
            .ranked()
            .into_iter()
            .map(|(name, aggregate)| {
                [
                    name.to_string(),
                    aggregate.commit_count.to_string(),
                    aggregate.additions.to_string(),
                    aggregate.deletions.to_string(),
                    aggregate.total().to_string(),
                ]
            })
            .collect();
        out.push_str(&format_table(&rows));
    }
    out.push('\n');

    out.push_str("Summary\n");
    let summary = [
        ("Repositories:", report.repositories.len() as u64),
        ("Commits:", report.total_commits),
        ("Lines added:", report.total_additions),
        ("Lines removed:", report.total_deletions),
        ("Total changes:", report.total_changes()),
    ];
    for (label, value) in summary {
        out.push_str(&format!("  {label:<15}{value}\n"));
    }

    if context.capped {
        out.push_str(&format!(
            "\nNote: commit search stopped at {SEARCH_RESULT_CAP} results; \
             totals may be incomplete for this date range.\n"
        ));
    }

    out
}

/// Aligns rows under [`HEADERS`]; names left-aligned, numbers right-aligned.
fn format_table(rows: &[[String; 5]]) -> String {
    let mut widths = HEADERS.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let format_line = |cells: [&str; 5]| -> String {
        let mut line = format!("{:<w$}", cells[0], w = widths[0]);
        for (cell, width) in cells.iter().zip(widths).skip(1) {
            line.push_str(&format!("  {cell:>width$}"));
        }
        line.push('\n');
        line
    };

    let mut out = format_line(HEADERS);
    let dashes = widths.map(|w| "-".repeat(w));
    out.push_str(&format_line(dashes.each_ref().map(String::as_str)));
    for row in rows {
        out.push_str(&format_line(row.each_ref().map(String::as_str)));
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    user: &'a str,
    organization: Option<&'a str>,
    start: String,
    end: String,
    date_kind: DateKind,
    strategy: Strategy,
    capped: bool,
    repositories: Vec<JsonRow<'a>>,
    totals: JsonTotals,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    repository: &'a str,
    commits: u64,
    additions: u64,
    deletions: u64,
    total: u64,
}

#[derive(Serialize)]
struct JsonTotals {
    repositories: usize,
    commits: u64,
    additions: u64,
    deletions: u64,
    total: u64,
}

/// Renders the report as pretty-printed JSON, repositories ranked like the table.
pub fn render_json(report: &AggregateReport, context: &ReportContext) -> Result<String> {
    let json = JsonReport {
        user: &context.user,
        organization: context.org.as_deref(),
        start: context.start.format("%Y-%m-%d").to_string(),
        end: context.end.format("%Y-%m-%d").to_string(),
        date_kind: context.date_kind,
        strategy: context.strategy,
        capped: context.capped,
        repositories: report
            .ranked()
            .into_iter()
            .map(|(repository, aggregate)| JsonRow {
                repository,
                commits: aggregate.commit_count,
                additions: aggregate.additions,
                deletions: aggregate.deletions,
                total: aggregate.total(),
            })
            .collect(),
        totals: JsonTotals {
            repositories: report.repositories.len(),
            commits: report.total_commits,
            additions: report.total_additions,
            deletions: report.total_deletions,
            total: report.total_changes(),
        },
    };
    serde_json::to_string_pretty(&json).context("Failed to serialize report to JSON")
}
