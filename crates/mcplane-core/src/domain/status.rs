//! Transient server status observations.
//!
//! A status is derived by probing the external CLI and cached for a fixed
//! window. It is never persisted as a source of truth: the stored
//! configuration is authoritative, the status is an approximation of what
//! the external CLI currently reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operational state of an MCP server as reported by the external CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerState {
    /// Not registered or not responding.
    #[default]
    Inactive,
    /// Registered and responding.
    Active,
    /// The CLI reported a failure for this server.
    Error,
    /// Registration in flight; state not yet settled.
    Connecting,
}

impl ServerState {
    /// Stable string tag used in storage and CLI output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Active => "active",
            Self::Error => "error",
            Self::Connecting => "connecting",
        }
    }
}

impl std::fmt::Display for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation of a server's operational state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStatus {
    /// Server name the observation belongs to.
    pub name: String,

    /// Observed state.
    pub state: ServerState,

    /// When the observation was made.
    pub last_check: DateTime<Utc>,

    /// Failure detail when `state` is `Error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Probe round-trip time in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

impl ServerStatus {
    /// Create an observation made now.
    pub fn observed(name: impl Into<String>, state: ServerState) -> Self {
        Self {
            name: name.into(),
            state,
            last_check: Utc::now(),
            error_message: None,
            response_time_ms: None,
        }
    }

    /// Create an error observation with a message.
    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: ServerState::Error,
            last_check: Utc::now(),
            error_message: Some(message.into()),
            response_time_ms: None,
        }
    }

    /// Set the probe round-trip time.
    #[must_use]
    pub const fn with_response_time(mut self, millis: u64) -> Self {
        self.response_time_ms = Some(millis);
        self
    }
}
