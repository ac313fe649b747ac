//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - Database pool and repositories (via mcplane-db)
//! - The Claude CLI subprocess runner and integration (via mcplane-mcp)
//! - The manager and context handler with injected probe and repos
//!
//! Command handlers receive the fully-composed `CliContext` and delegate
//! work to it.

use std::sync::Arc;

use anyhow::Result;

use mcplane_core::paths::database_path;
use mcplane_core::ports::ServerStatusProbe;
use mcplane_db::{build_repos, setup_database};
use mcplane_mcp::{ClaudeCli, ClaudeIntegration, ContextHandler, McpManager};

/// Environment variable overriding the external CLI binary.
pub const CLAUDE_BIN_ENV: &str = "MCPLANE_CLAUDE_BIN";

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Name or path of the external Claude CLI binary.
    pub claude_binary: String,
}

impl CliConfig {
    /// Create config from the environment, with defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            claude_binary: std::env::var(CLAUDE_BIN_ENV)
                .unwrap_or_else(|_| mcplane_mcp::claude::DEFAULT_BINARY.to_string()),
        }
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    /// Server lifecycle manager.
    pub manager: McpManager,
    /// Active-context handler and query router.
    pub context: ContextHandler,
}

/// Bootstrap the CLI application.
///
/// This is the composition root. It:
/// 1. Resolves paths and opens the database with full schema setup
/// 2. Builds the repository container
/// 3. Builds the Claude CLI integration, shared as runner and probe
/// 4. Assembles the manager and context handler
pub async fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let db_path = database_path()?;
    let pool = setup_database(&db_path).await?;
    let repos = build_repos(&pool);

    let runner = Arc::new(ClaudeCli::new(config.claude_binary));
    let integration =
        Arc::new(ClaudeIntegration::new(runner).with_usage_sink(repos.usage.clone()));
    let probe: Arc<dyn ServerStatusProbe> = integration.clone();

    let manager = McpManager::new(repos.clone(), probe);
    let context = ContextHandler::new(repos, integration);

    Ok(CliContext { manager, context })
}
