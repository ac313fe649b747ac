//! External server status probe port.
//!
//! The external CLI's list output is not a stable contract, so status
//! inference is best-effort by design. This port isolates the fragile
//! text parsing: callers receive structured observations and never see
//! CLI output. The parsing can be swapped for a structured probe (e.g.,
//! a JSON output mode) without touching callers.

use async_trait::async_trait;

use super::CliRunnerError;
use crate::domain::ServerState;

/// One server entry as reported by the external CLI's registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbedServer {
    /// Server name as registered with the CLI.
    pub name: String,
    /// Classified state.
    pub state: ServerState,
    /// Free-text detail lines following the entry.
    pub details: String,
}

/// Probes the external CLI for registered servers and their states.
///
/// Observations are approximate: they must never be treated as
/// authoritative for anything beyond displaying a status.
#[async_trait]
pub trait ServerStatusProbe: Send + Sync {
    /// Enumerate the servers the external CLI currently knows about.
    ///
    /// # Errors
    ///
    /// Propagates runner failures; callers are expected to degrade to an
    /// error status rather than surface these.
    async fn list_servers(&self, user_id: i64) -> Result<Vec<ProbedServer>, CliRunnerError>;

    /// Register a server with the external CLI.
    ///
    /// Returns whether the CLI accepted the registration.
    async fn register(
        &self,
        user_id: i64,
        name: &str,
        env: &[(String, String)],
        launch_argv: &[String],
    ) -> Result<bool, CliRunnerError>;

    /// Deregister a server from the external CLI.
    ///
    /// Returns whether the CLI accepted the removal.
    async fn deregister(&self, user_id: i64, name: &str) -> Result<bool, CliRunnerError>;
}
