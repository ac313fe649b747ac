//! Active-context handling and query routing.
//!
//! Each user designates at most one server as their active context;
//! queries route to it implicitly. The pointer is validated on selection
//! and re-validated on use, since the referenced server can be disabled
//! or removed between the two.

use std::sync::Arc;

use serde::Serialize;

use mcplane_core::domain::{ActiveContext, UsageStats};
use mcplane_core::ports::{Repos, RepositoryError};
use mcplane_core::McpError;

use crate::claude::{ClaudeIntegration, ClaudeResponse};

/// Usage window shown alongside the active context.
const SUMMARY_WINDOW_DAYS: u32 = 7;

/// Active context plus recent usage, for display.
#[derive(Debug, Serialize)]
pub struct ContextSummary {
    /// The active context, if one is set.
    pub context: Option<ActiveContext>,
    /// Usage aggregate over the last [`SUMMARY_WINDOW_DAYS`] days.
    pub stats: UsageStats,
}

/// Routes queries through the per-user active context.
pub struct ContextHandler {
    repos: Repos,
    integration: Arc<ClaudeIntegration>,
}

impl ContextHandler {
    /// Create a handler over the given storage and CLI integration.
    pub fn new(repos: Repos, integration: Arc<ClaudeIntegration>) -> Self {
        Self { repos, integration }
    }

    /// Select a server as the user's active context.
    ///
    /// The server must exist and be enabled; a disabled server cannot
    /// receive queries, so selecting it would create a dead pointer.
    ///
    /// # Errors
    ///
    /// - `ServerNotFound` if the user has no server with the given name
    /// - `Context` if the server is disabled
    /// - `Repository` for storage errors
    pub async fn set_active_context(
        &self,
        user_id: i64,
        server_name: &str,
    ) -> Result<ActiveContext, McpError> {
        let record = match self.repos.servers.get(user_id, server_name).await {
            Ok(record) => record,
            Err(RepositoryError::NotFound(_)) => {
                return Err(McpError::ServerNotFound(server_name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if !record.enabled {
            return Err(McpError::Context(format!(
                "Server '{server_name}' is disabled; enable it before selecting it"
            )));
        }

        let context = ActiveContext::new(user_id, server_name);
        self.repos.contexts.set(&context).await?;

        tracing::info!(user_id, server_name = %server_name, "Active context set");
        Ok(context)
    }

    /// Get the user's active context, if any.
    ///
    /// # Errors
    ///
    /// - `Repository` for storage errors
    pub async fn active_context(&self, user_id: i64) -> Result<Option<ActiveContext>, McpError> {
        Ok(self.repos.contexts.get(user_id).await?)
    }

    /// Clear the user's active context. Clearing an absent pointer is a no-op.
    ///
    /// # Errors
    ///
    /// - `Repository` for storage errors
    pub async fn clear_active_context(&self, user_id: i64) -> Result<(), McpError> {
        self.repos.contexts.clear(user_id).await?;
        tracing::info!(user_id, "Active context cleared");
        Ok(())
    }

    /// Execute a query against the user's active context.
    ///
    /// The pointer is re-validated before dispatch: a pointer to a
    /// removed server is cleared and reported, a pointer to a disabled
    /// server is reported but kept (re-enabling the server revives it).
    ///
    /// # Errors
    ///
    /// - `Context` if no active context is set, or it references a
    ///   removed or disabled server
    /// - `Command` if the CLI subprocess fails
    /// - `Repository` for storage errors
    pub async fn execute_contextual_query(
        &self,
        user_id: i64,
        prompt: &str,
        working_dir: Option<&str>,
        session_id: Option<&str>,
    ) -> Result<ClaudeResponse, McpError> {
        let Some(context) = self.repos.contexts.get(user_id).await? else {
            return Err(McpError::Context(
                "No active server context; select a server first".to_string(),
            ));
        };

        let record = match self.repos.servers.get(user_id, &context.server_name).await {
            Ok(record) => record,
            Err(RepositoryError::NotFound(_)) => {
                self.repos.contexts.clear(user_id).await?;
                return Err(McpError::Context(format!(
                    "Active server '{}' no longer exists; context cleared",
                    context.server_name
                )));
            }
            Err(e) => return Err(e.into()),
        };

        if !record.enabled {
            return Err(McpError::Context(format!(
                "Active server '{}' is disabled; enable it or select another",
                record.name
            )));
        }

        let working_directory =
            working_dir.or_else(|| context.settings.get("working_directory").map(String::as_str));

        self.integration
            .run_command_with_mcp(user_id, prompt, working_directory, &record.name, session_id)
            .await
    }

    /// Active context plus a recent usage aggregate, for display.
    ///
    /// # Errors
    ///
    /// - `Repository` for storage errors
    pub async fn context_summary(&self, user_id: i64) -> Result<ContextSummary, McpError> {
        let context = self.repos.contexts.get(user_id).await?;
        let stats = self.repos.usage.stats(user_id, SUMMARY_WINDOW_DAYS).await?;
        Ok(ContextSummary { context, stats })
    }
}
