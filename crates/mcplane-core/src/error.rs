//! Service-level error taxonomy.
//!
//! One enum covers the manager, context handler, and CLI integration.
//! Repository errors pass through transparently; infrastructure details
//! (sqlx errors, OS process errors) never appear in these messages.

use thiserror::Error;

use crate::ports::RepositoryError;

/// Errors raised by MCP operations.
#[derive(Debug, Error)]
pub enum McpError {
    /// Malformed or disallowed user-supplied configuration
    /// (bad path, bad token shape, duplicate name).
    #[error("Invalid configuration: {0}")]
    Validation(String),

    /// Operation referenced a server name that does not exist for the user.
    #[error("Server not found: {0}")]
    ServerNotFound(String),

    /// Active-context operation is invalid (e.g., selecting a disabled server).
    #[error("Context error: {0}")]
    Context(String),

    /// Reserved for transport-level failures.
    #[error("Connection error: {0}")]
    Connection(String),

    /// External CLI invocation failed.
    #[error("Command failed: {0}")]
    Command(String),

    /// Reserved for systemic misconfiguration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Storage operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl McpError {
    /// Whether this error is safe to show verbatim to an end user.
    ///
    /// Validation, not-found, and context errors carry user-facing
    /// messages; the rest should be summarized by the presentation layer.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::ServerNotFound(_) | Self::Context(_)
        )
    }
}
