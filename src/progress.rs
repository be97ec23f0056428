//! Progress reporting.
//!
//! Discovery and aggregation emit [`ProgressEvent`]s to a [`ProgressObserver`]
//! after each unit of work. They never touch the terminal themselves.

use std::io::{self, IsTerminal, Stderr, Write};

use crossterm::{
    cursor::MoveToColumn,
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};

/// A completed unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent<'a> {
    /// The search index reported this many matches.
    SearchEstimate {
        /// Reported match count.
        total: u64,
    },
    /// One search page was processed.
    SearchPage {
        /// 1-based page number.
        page: u32,
        /// Valid records on this page.
        found: usize,
        /// Records kept so far.
        accumulated: usize,
        /// Estimate from [`ProgressEvent::SearchEstimate`], if any.
        estimate: Option<u64>,
    },
    /// The organization's repositories were listed.
    RepositoriesListed {
        /// Number of repositories.
        count: usize,
    },
    /// A repository scan started.
    RepositoryStarted {
        /// 1-based position.
        index: usize,
        /// Number of repositories.
        total: usize,
        /// `owner/name`.
        repository: &'a str,
    },
    /// One branch of a repository was scanned.
    BranchScanned {
        /// `owner/name`.
        repository: &'a str,
        /// Branch name.
        branch: &'a str,
        /// New commits found on this branch.
        found: usize,
    },
    /// Stats for one commit were fetched (or defaulted).
    StatsFetched {
        /// Commits processed so far.
        done: usize,
        /// Commits to process.
        total: usize,
    },
    /// A non-fatal problem the user should know about.
    Warning {
        /// Human readable description.
        message: &'a str,
    },
}

impl ProgressEvent<'_> {
    /// Returns true for [`ProgressEvent::Warning`].
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning { .. })
    }

    /// Renders the event as a single status line.
    pub fn message(&self) -> String {
        match self {
            Self::SearchEstimate { total } => format!("🔍 Search index reports {total} commits"),
            Self::SearchPage {
                page,
                accumulated,
                estimate: Some(estimate),
                ..
            } => format!("🔍 Search page {page}: {accumulated}/{estimate} commits"),
            Self::SearchPage {
                page, accumulated, ..
            } => format!("🔍 Search page {page}: {accumulated} commits"),
            Self::RepositoriesListed { count } => format!("📂 Found {count} repositories"),
            Self::RepositoryStarted {
                index,
                total,
                repository,
            } => format!("📂 [{index}/{total}] Scanning {repository}"),
            Self::BranchScanned {
                repository,
                branch,
                found,
            } => format!("🌿 {repository}@{branch}: {found} commits"),
            Self::StatsFetched { done, total } => format!("📊 Fetching stats {done}/{total}"),
            Self::Warning { message } => format!("warning: {message}"),
        }
    }
}

/// Receives progress events from the pipeline.
pub trait ProgressObserver {
    /// Called after each unit of work.
    fn on_event(&mut self, event: &ProgressEvent<'_>);

    /// Called once when the pipeline is done.
    fn finish(&mut self) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_event(&mut self, _event: &ProgressEvent<'_>) {}
}

/// Renders a single updating status line on stderr.
///
/// Warnings always get their own line. Status lines are only drawn when
/// stderr is a terminal.
pub struct TerminalProgress {
    out: Stderr,
    interactive: bool,
    line_active: bool,
}

impl TerminalProgress {
    /// Creates an observer writing to stderr.
    pub fn new() -> Self {
        let out = io::stderr();
        let interactive = out.is_terminal();
        Self {
            out,
            interactive,
            line_active: false,
        }
    }

    fn clear_line(&mut self) -> io::Result<()> {
        if self.line_active {
            queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
            self.line_active = false;
        }
        Ok(())
    }

    fn render(&mut self, event: &ProgressEvent<'_>) -> io::Result<()> {
        if event.is_warning() {
            self.clear_line()?;
            writeln!(self.out, "{}", event.message())?;
        } else if self.interactive {
            self.clear_line()?;
            queue!(self.out, Print(event.message()))?;
            self.line_active = true;
        }
        self.out.flush()
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for TerminalProgress {
    fn on_event(&mut self, event: &ProgressEvent<'_>) {
        // Progress output is best-effort; a closed stderr must not abort the run.
        let _ = self.render(event);
    }

    fn finish(&mut self) {
        let _ = self.clear_line().and_then(|()| self.out.flush());
    }
}

/// Observer that keeps rendered messages for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingProgress {
    pub(crate) messages: Vec<String>,
    pub(crate) warnings: Vec<String>,
}

#[cfg(test)]
impl ProgressObserver for RecordingProgress {
    fn on_event(&mut self, event: &ProgressEvent<'_>) {
        if let ProgressEvent::Warning { message } = event {
            self.warnings.push((*message).to_string());
        }
        self.messages.push(event.message());
    }
}
