//! Error types surfaced to the user.

use std::time::Duration;

use thiserror::Error;

/// Rejected command-line input.
///
/// Every variant carries the offending value so the message can point at it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// User name is not a valid GitHub login.
    #[error("Invalid GitHub user name: '{0}'")]
    InvalidUser(String),

    /// Organization name is not a valid GitHub organization login.
    #[error("Invalid GitHub organization name: '{0}'")]
    InvalidOrg(String),

    /// Date is not `YYYY-MM-DD` or does not exist in the calendar.
    #[error("Invalid date '{0}': expected an existing calendar date in YYYY-MM-DD format")]
    InvalidDate(String),

    /// Date kind is not one of the supported values.
    #[error("Invalid date kind '{0}': expected 'author-date' or 'committer-date'")]
    InvalidDateKind(String),
}

/// Failures talking to the GitHub CLI.
#[derive(Error, Debug)]
pub enum GhError {
    /// `gh` is missing or not logged in.
    #[error("GitHub CLI is not available or not authenticated. Run 'gh auth login' and try again")]
    Unavailable,

    /// The `gh` process could not be started.
    #[error("Failed to start GitHub CLI: {0}")]
    Spawn(#[from] std::io::Error),

    /// `gh` exited with a non-zero status.
    #[error("GitHub CLI call failed ({status}): {stderr}")]
    Failed {
        /// Exit status as reported by the OS.
        status: String,
        /// Trimmed stderr of the child.
        stderr: String,
    },

    /// The call exceeded its deadline and the child was killed.
    #[error("GitHub CLI call timed out after {0:?}")]
    Timeout(Duration),

    /// Stdout or stderr exceeded the output cap.
    #[error("GitHub CLI output exceeded {0} bytes")]
    OutputTooLarge(usize),

    /// Stdout was not valid UTF-8.
    #[error("GitHub CLI output is not valid UTF-8")]
    InvalidUtf8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_name_the_value() {
        let err = ValidationError::InvalidUser("-bad".to_string());
        assert!(err.to_string().contains("'-bad'"));

        let err = ValidationError::InvalidDate("2026-02-30".to_string());
        assert!(err.to_string().contains("2026-02-30"));

        let err = ValidationError::InvalidDateKind("push-date".to_string());
        assert!(err.to_string().contains("push-date"));
    }

    #[test]
    fn unavailable_message_is_generic() {
        let msg = GhError::Unavailable.to_string();
        assert!(msg.contains("gh auth login"));
    }
}
