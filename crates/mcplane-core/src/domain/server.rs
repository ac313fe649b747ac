//! MCP server configuration types.
//!
//! A server configuration describes how to launch one external MCP server
//! through the Claude CLI (command, arguments, environment). Configurations
//! are scoped to a single owning user; the name is unique within that
//! user's set.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Supported MCP server kinds.
///
/// Each kind has a matching setup template in [`crate::templates`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerKind {
    /// GitHub repository access (issues, PRs, code search).
    Github,
    /// Local filesystem access rooted at a configured directory.
    Filesystem,
    /// PostgreSQL database access via connection string.
    Postgres,
    /// SQLite database file access.
    Sqlite,
    /// Git repository operations (log, diff, blame).
    Git,
    /// Browser automation via Playwright.
    Playwright,
}

impl ServerKind {
    /// All kinds with a setup template, in presentation order.
    pub const ALL: [Self; 6] = [
        Self::Github,
        Self::Filesystem,
        Self::Postgres,
        Self::Sqlite,
        Self::Git,
        Self::Playwright,
    ];

    /// Stable string tag used in storage and CLI arguments.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Filesystem => "filesystem",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
            Self::Git => "git",
            Self::Playwright => "playwright",
        }
    }

    /// Parse a storage/CLI tag back into a kind.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "github" => Some(Self::Github),
            "filesystem" => Some(Self::Filesystem),
            "postgres" => Some(Self::Postgres),
            "sqlite" => Some(Self::Sqlite),
            "git" => Some(Self::Git),
            "playwright" => Some(Self::Playwright),
            _ => None,
        }
    }
}

impl std::fmt::Display for ServerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Environment variable entry for a server process.
///
/// Note: values are stored base64-encoded in the database. This is
/// encoding, NOT encryption. A follow-up task should add proper at-rest
/// protection (e.g., OS keychain integration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvEntry {
    /// Environment variable key.
    pub key: String,
    /// Environment variable value (stored encoded, not encrypted).
    pub value: String,
}

impl EnvEntry {
    /// Create a new environment variable entry.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A server configuration to be inserted (no ID yet).
///
/// After insertion the repository returns a [`ServerRecord`] with the
/// assigned ID and creation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewServer {
    /// Owning user.
    pub user_id: i64,

    /// Name, unique within the owning user's server set.
    pub name: String,

    /// Server kind (selects the template used to build this config).
    pub kind: ServerKind,

    /// Executable name (e.g., "npx").
    pub command: String,

    /// Ordered arguments for the executable.
    pub args: Vec<String>,

    /// Environment variables for the server process (tokens, secrets).
    pub env: Vec<EnvEntry>,

    /// Free-form template-specific fields (path, repo, etc.).
    pub config: HashMap<String, String>,

    /// Whether the server should be registered with the external CLI.
    pub enabled: bool,
}

impl NewServer {
    /// Create a new server configuration with the given launch triple.
    #[must_use]
    pub fn new(
        user_id: i64,
        name: impl Into<String>,
        kind: ServerKind,
        command: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            user_id,
            name: name.into(),
            kind,
            command: command.into(),
            args,
            env: Vec::new(),
            config: HashMap::new(),
            enabled: true,
        }
    }

    /// Add an environment variable.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push(EnvEntry::new(key, value));
        self
    }

    /// Add a template-specific config field.
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Set the enabled flag.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// A persisted server configuration with a database ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerRecord {
    /// Database ID of the server.
    pub id: i64,

    /// Owning user.
    pub user_id: i64,

    /// Name, unique within the owning user's server set.
    pub name: String,

    /// Server kind.
    pub kind: ServerKind,

    /// Executable name.
    pub command: String,

    /// Ordered arguments for the executable.
    pub args: Vec<String>,

    /// Environment variables for the server process.
    pub env: Vec<EnvEntry>,

    /// Free-form template-specific fields.
    pub config: HashMap<String, String>,

    /// Whether the server is registered with the external CLI.
    pub enabled: bool,

    /// When the server was added.
    pub created_at: DateTime<Utc>,
}

impl ServerRecord {
    /// Full argument vector for `<cli> mcp add`: `<command> <args...>`.
    #[must_use]
    pub fn launch_argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(1 + self.args.len());
        argv.push(self.command.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }
}
