//! CLI interface for gh-commit-stats.

use anyhow::Result;
use chrono::Local;
use clap::{Parser, ValueEnum};

use crate::error::{GhError, ValidationError};
use crate::github::GhCli;
use crate::progress::{NoProgress, ProgressObserver, TerminalProgress};
use crate::report::{render_json, render_table};
use crate::utils::check_github_cli;
use crate::validation::{RawInput, StatsConfig};

/// Message shown for errors that carry no user-facing detail.
pub const GENERIC_ERROR: &str =
    "An unexpected error occurred. Set RUST_LOG=debug for details";

/// Report output formats.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table with a summary.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

/// gh-commit-stats: lines added and removed by a GitHub user over a date range.
#[derive(Parser, Debug)]
#[command(name = "gh-commit-stats")]
#[command(
    about = "Aggregate commit statistics for a GitHub user over a date range",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// GitHub user whose commits are counted.
    #[arg(value_name = "USER")]
    pub user: String,

    /// First day of the range (YYYY-MM-DD).
    #[arg(short, long, value_name = "DATE")]
    pub start: String,

    /// Last day of the range (YYYY-MM-DD). Defaults to today.
    #[arg(short, long, value_name = "DATE")]
    pub end: Option<String>,

    /// Scan every repository and branch of this organization instead of using commit search.
    #[arg(short, long, value_name = "ORG")]
    pub org: Option<String>,

    /// Timestamp the range applies to: author-date or committer-date (default).
    #[arg(short, long, value_name = "KIND")]
    pub date_kind: Option<String>,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Do not draw progress on stderr.
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    /// Returns the arguments as unvalidated input.
    pub fn raw_input(&self) -> RawInput {
        RawInput {
            user: self.user.clone(),
            org: self.org.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
            date_kind: self.date_kind.clone(),
        }
    }

    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        let config = StatsConfig::from_raw(&self.raw_input(), Local::now().date_naive())?;

        let gh = GhCli::from_env();
        check_github_cli(&gh).await?;

        let mut observer: Box<dyn ProgressObserver> = if self.no_progress {
            Box::new(NoProgress)
        } else {
            Box::new(TerminalProgress::new())
        };

        let outcome = crate::pipeline::run(&gh, config, observer.as_mut()).await;
        observer.finish();

        match self.format {
            OutputFormat::Table => print!("{}", render_table(&outcome.report, &outcome.context)),
            OutputFormat::Json => println!("{}", render_json(&outcome.report, &outcome.context)?),
        }

        Ok(())
    }
}

/// Returns the message to show for a failed run.
///
/// Validation and availability errors are shown as-is; anything else gets a
/// generic message so internal details stay out of the output.
pub fn user_facing_message(err: &anyhow::Error) -> String {
    if let Some(validation) = err.downcast_ref::<ValidationError>() {
        return validation.to_string();
    }
    if let Some(gh @ GhError::Unavailable) = err.downcast_ref::<GhError>() {
        return gh.to_string();
    }
    GENERIC_ERROR.to_string()
}

/// Exit status for an argument parsing outcome.
///
/// `--help` and `--version` exit with 0; usage errors count as invalid input.
pub fn parse_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}
