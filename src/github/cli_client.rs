//! `gh` subprocess client.

use std::ffi::OsStr;
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::debug;

use super::{ApiRequest, GhClient, MAX_OUTPUT_BYTES};
use crate::error::GhError;
use crate::utils::settings::get_env_var;

/// Environment variable (or settings key) overriding the `gh` executable.
pub const GH_PATH_VAR: &str = "GH_PATH";

/// Runs `gh api` as a child process, one call at a time.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: String,
    max_output: usize,
}

impl GhCli {
    /// Creates a client for the given executable.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            max_output: MAX_OUTPUT_BYTES,
        }
    }

    /// Creates a client for `$GH_PATH`, falling back to `gh` on `PATH`.
    pub fn from_env() -> Self {
        let program = get_env_var(GH_PATH_VAR).unwrap_or_else(|_| "gh".to_string());
        Self::new(program)
    }

    /// Overrides the cap applied to stdout and stderr.
    pub fn with_max_output(mut self, max_output: usize) -> Self {
        self.max_output = max_output;
        self
    }

    /// Returns the executable this client runs.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Runs `gh` with raw arguments under the request's deadline and output cap.
    pub async fn run<S: AsRef<OsStr>>(
        &self,
        args: &[S],
        timeout: Duration,
    ) -> Result<String, GhError> {
        let started = Instant::now();
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("stderr was not captured"))?;

        let cap = self.max_output;
        let collect = async {
            let (out, err) =
                tokio::try_join!(read_capped(stdout, cap), read_capped(stderr, cap))?;
            let status = child.wait().await?;
            Ok::<_, GhError>((status, out, err))
        };

        // Dropping the child on timeout or overflow kills it.
        let (status, out, err) = tokio::time::timeout(timeout, collect)
            .await
            .map_err(|_| GhError::Timeout(timeout))??;

        debug!(
            program = %self.program,
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = out.len(),
            "gh call finished"
        );

        if !status.success() {
            return Err(GhError::Failed {
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&err).trim().to_string(),
            });
        }

        String::from_utf8(out).map_err(|_| GhError::InvalidUtf8)
    }
}

impl Default for GhCli {
    fn default() -> Self {
        Self::new("gh")
    }
}

impl GhClient for GhCli {
    fn api<'a>(
        &'a self,
        request: &'a ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            debug!(endpoint = %request.endpoint, timeout = ?request.timeout, "Calling gh api");
            Ok(self.run(&request.args(), request.timeout).await?)
        })
    }
}

/// Reads at most `cap` bytes of stdout or stderr; one more byte means the output is too large.
async fn read_capped<R: AsyncRead + Unpin>(reader: R, cap: usize) -> Result<Vec<u8>, GhError> {
    let mut buf = Vec::new();
    reader.take(cap as u64 + 1).read_to_end(&mut buf).await?;
    if buf.len() > cap {
        return Err(GhError::OutputTooLarge(cap));
    }
    Ok(buf)
}
