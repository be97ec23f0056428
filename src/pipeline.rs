//! Pipeline: discovery, then aggregation.

use tracing::info;

use crate::discovery::{discover_commits, Discovery};
use crate::github::GhClient;
use crate::progress::ProgressObserver;
use crate::report::ReportContext;
use crate::stats::{aggregate, AggregateReport};
use crate::validation::StatsConfig;

/// Everything a finished run hands to the reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRun {
    /// Summed statistics.
    pub report: AggregateReport,
    /// Header and metadata for rendering.
    pub context: ReportContext,
}

/// Runs discovery and aggregation for a validated configuration.
///
/// Never fails: API problems shrink the result instead. Only the sums
/// survive; the discovered commits are dropped once counted.
pub async fn run(
    client: &dyn GhClient,
    config: StatsConfig,
    observer: &mut dyn ProgressObserver,
) -> StatsRun {
    let discovery: Discovery = discover_commits(client, &config, observer).await;
    info!(
        strategy = ?discovery.strategy,
        commits = discovery.commits.len(),
        capped = discovery.capped,
        "Discovery finished"
    );

    let report = aggregate(client, &discovery.commits, observer).await;
    let context = ReportContext::new(&config, &discovery);

    StatsRun { report, context }
}
