//! External CLI execution port.
//!
//! Every interaction with the external Claude CLI funnels through one
//! primitive: build an argument vector, run it as a subprocess with a
//! fixed environment and timeout, get back a structured result.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from running the external CLI.
#[derive(Debug, Error)]
pub enum CliRunnerError {
    /// The process did not complete within the enforced timeout.
    #[error("Command timed out after {0} seconds")]
    Timeout(u64),

    /// The process could not be spawned (binary missing, permissions).
    #[error("Failed to spawn command: {0}")]
    Spawn(String),

    /// I/O failure while capturing output.
    #[error("Command I/O error: {0}")]
    Io(String),

    /// The process ran to completion but exited unsuccessfully.
    #[error("Command exited with code {code}: {stderr}", code = .exit_code.unwrap_or(-1))]
    Failed {
        /// Exit code (None if terminated by signal).
        exit_code: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },
}

/// Completed-process result from one CLI invocation.
///
/// stdout/stderr are decoded with error-tolerant UTF-8; the raw exit code
/// is preserved so callers can classify outcomes themselves.
#[derive(Debug, Clone)]
pub struct CliOutput {
    /// Process exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CliOutput {
    /// Whether the process exited with code zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executes external CLI invocations.
///
/// Implementations enforce the timeout and fixed environment; callers
/// supply only the argument vector.
#[async_trait]
pub trait CliRunner: Send + Sync {
    /// Run the external CLI with the given arguments.
    ///
    /// # Errors
    ///
    /// - `Timeout` if the process exceeds the runner's deadline
    /// - `Spawn`/`Io` for process-level failures
    async fn run(&self, args: &[String]) -> Result<CliOutput, CliRunnerError>;
}
