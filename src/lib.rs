//! # gh-commit-stats
//!
//! Aggregate commit statistics (commits, lines added and removed) for a
//! GitHub user over a date range, optionally limited to one organization.
//!
//! All GitHub access goes through the `gh` command-line client, which must be
//! installed and logged in.
//!
//! ## Pipeline
//!
//! 1. [`validation`] turns raw arguments into a [`StatsConfig`].
//! 2. [`discovery`] finds the user's commits, through the commit search index
//!    or by iterating an organization's repositories and branches.
//! 3. [`stats`] fetches per-commit line counts and sums them.
//! 4. [`report`] renders the sums as a table or JSON.
//!
//! ```no_run
//! use gh_commit_stats::github::GhCli;
//! use gh_commit_stats::progress::NoProgress;
//! use gh_commit_stats::validation::{RawInput, StatsConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let raw = RawInput {
//!     user: "alice".to_string(),
//!     start: "2026-01-01".to_string(),
//!     end: Some("2026-01-31".to_string()),
//!     ..RawInput::default()
//! };
//! let config = StatsConfig::from_raw(&raw, chrono::Local::now().date_naive())?;
//! let outcome = gh_commit_stats::pipeline::run(&GhCli::default(), config, &mut NoProgress).await;
//! println!("{} commits", outcome.report.total_commits);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;

pub mod discovery;
pub mod error;
pub mod github;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod stats;
pub mod utils;
pub mod validation;

pub use crate::cli::Cli;
pub use crate::validation::StatsConfig;

/// The current version of gh-commit-stats.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
