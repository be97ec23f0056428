//! GitHub access through the `gh` command-line client.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::Result;
use serde::de::DeserializeOwned;
use tracing::debug;

pub mod cli_client;
pub mod query;
#[cfg(test)]
pub(crate) mod test_utils;

pub use cli_client::GhCli;

/// Deadline for a single call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Deadline for one page of a bulk paginated listing.
pub const BULK_TIMEOUT: Duration = Duration::from_secs(90);

/// Upper bound on each output stream of one call.
pub const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// One `gh api` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// REST path relative to the API root, including the query string.
    pub endpoint: String,
    /// Projection applied by `gh` to the JSON response.
    pub jq: Option<String>,
    /// How long the call may take before it is killed.
    pub timeout: Duration,
}

impl ApiRequest {
    /// Creates a request with the default timeout and no projection.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            jq: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the `--jq` projection.
    pub fn with_jq(mut self, jq: impl Into<String>) -> Self {
        self.jq = Some(jq.into());
        self
    }

    /// Marks the request as bulk retrieval, which gets the longer timeout.
    pub fn bulk(mut self) -> Self {
        self.timeout = BULK_TIMEOUT;
        self
    }

    /// Returns the argument vector passed to `gh`.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["api".to_string(), self.endpoint.clone()];
        if let Some(jq) = &self.jq {
            args.push("--jq".to_string());
            args.push(jq.clone());
        }
        args
    }
}

/// Trait for clients able to execute GitHub API calls.
pub trait GhClient: Send + Sync {
    /// Executes the request and returns its raw stdout.
    fn api<'a>(
        &'a self,
        request: &'a ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}

/// Parses newline-delimited JSON, skipping blank or malformed lines.
pub fn parse_records<T: DeserializeOwned>(output: &str) -> Vec<T> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(line, "Skipping unparseable record: {e}");
                None
            }
        })
        .collect()
}
