//! Preflight validation checks for early failure detection
//!
//! Discovery issues hundreds of `gh` calls and treats each failure as missing
//! data. Checking the client once up front turns a missing or logged-out `gh`
//! into a single clear error instead of an empty report.

use tracing::debug;

use crate::error::GhError;
use crate::github::{GhCli, DEFAULT_TIMEOUT};

/// Validate GitHub CLI is available and authenticated
///
/// This checks:
/// 1. `gh` is installed and runnable
/// 2. `gh auth status` reports a logged-in account
///
/// Any failure maps to [`GhError::Unavailable`]; the underlying cause is only
/// logged at debug level.
pub async fn check_github_cli(gh: &GhCli) -> Result<(), GhError> {
    for args in [&["--version"][..], &["auth", "status"][..]] {
        if let Err(e) = gh.run(args, DEFAULT_TIMEOUT).await {
            debug!(program = gh.program(), ?args, "GitHub CLI preflight failed: {e}");
            return Err(GhError::Unavailable);
        }
    }
    Ok(())
}
