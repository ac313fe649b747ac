//! CLI-specific error types and exit-code mapping.

use mcplane_core::McpError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Service-level error from the mcp crate.
    #[error("{0}")]
    Service(String),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// External CLI process error.
    #[error("Process error: {0}")]
    Process(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 1: General error
    /// - 2: Misuse (invalid arguments)
    /// - 69: Service unavailable (external CLI)
    /// - 74: IO
    /// - 78: Configuration
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Service(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Process(_) => 69,  // EX_UNAVAILABLE
            Self::Database(_) => 74, // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<&McpError> for CliError {
    fn from(e: &McpError) -> Self {
        match e {
            McpError::Validation(_) => Self::Arguments(e.to_string()),
            McpError::Command(_) | McpError::Connection(_) => Self::Process(e.to_string()),
            McpError::Repository(_) => Self::Database(e.to_string()),
            McpError::Configuration(_) => Self::Config(e.to_string()),
            McpError::ServerNotFound(_) | McpError::Context(_) => Self::Service(e.to_string()),
        }
    }
}

impl From<McpError> for CliError {
    fn from(e: McpError) -> Self {
        Self::from(&e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Arguments("bad".into()).exit_code(), 2);
        assert_eq!(CliError::Process("spawn".into()).exit_code(), 69);
        assert_eq!(CliError::Database("locked".into()).exit_code(), 74);
    }

    #[test]
    fn test_validation_maps_to_usage() {
        let err: CliError = McpError::Validation("token too short".into()).into();
        assert_eq!(err.exit_code(), 2);
    }
}
