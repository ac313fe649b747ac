//! MCP server manager.
//!
//! Owns the per-user server lifecycle: template-driven creation, the
//! enable/disable bridge to the external CLI's registry, cached status
//! reads, and a reconciliation pass that re-aligns the CLI with stored
//! configuration. Storage is authoritative throughout; the CLI registry
//! is treated as a cache of it.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Duration;

use mcplane_core::domain::{
    NewUsageRecord, ServerRecord, ServerState, ServerStatus, UsageRecord, UsageStats,
};
use mcplane_core::ports::{Repos, RepositoryError, ServerStatusProbe};
use mcplane_core::templates::{self, TemplateInfo};
use mcplane_core::{McpError, ServerKind};

use crate::cache::StatusCache;

/// A stored server paired with its template's presentation metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ServerOverview {
    /// The stored configuration.
    pub server: ServerRecord,
    /// Presentation metadata for the server's kind.
    pub template: TemplateInfo,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Default, Serialize)]
pub struct ReconcileReport {
    /// Enabled servers that were missing from the CLI and got registered.
    pub registered: Vec<String>,
    /// Disabled servers that were still in the CLI and got deregistered.
    pub removed: Vec<String>,
}

impl ReconcileReport {
    /// Whether the pass found nothing to fix.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.registered.is_empty() && self.removed.is_empty()
    }
}

/// Manages per-user MCP server configurations.
///
/// Mutating operations for one user are serialized through a per-user
/// lock so the read-check-bridge-write sequences cannot interleave.
/// Different users never contend.
pub struct McpManager {
    repos: Repos,
    probe: Arc<dyn ServerStatusProbe>,
    cache: StatusCache,
    user_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl McpManager {
    /// Create a manager over the given storage and probe.
    pub fn new(repos: Repos, probe: Arc<dyn ServerStatusProbe>) -> Self {
        Self {
            repos,
            probe,
            cache: StatusCache::default(),
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Override the status cache freshness window.
    #[must_use]
    pub fn with_status_ttl(mut self, ttl: Duration) -> Self {
        self.cache = StatusCache::new(ttl);
        self
    }

    async fn user_lock(&self, user_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        locks.entry(user_id).or_default().clone()
    }

    // ─────────────────────────────────────────────────────────────────────
    // CRUD
    // ─────────────────────────────────────────────────────────────────────

    /// Create a server from a template and register it with the CLI.
    ///
    /// Validation failures and duplicate names surface as `Validation`.
    /// Registration with the CLI is best-effort at creation time: the
    /// stored row is the source of truth, and a later status read or
    /// reconciliation pass reports and repairs a failed registration.
    ///
    /// # Errors
    ///
    /// - `Validation` if the template inputs are rejected or the name is taken
    /// - `Repository` for storage errors
    pub async fn add_server(
        &self,
        user_id: i64,
        name: &str,
        kind: ServerKind,
        inputs: &HashMap<String, String>,
    ) -> Result<ServerRecord, McpError> {
        let server = templates::build(user_id, name, kind, inputs).map_err(McpError::Validation)?;

        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let record = match self.repos.servers.insert(server).await {
            Ok(record) => record,
            Err(RepositoryError::Conflict(name)) => {
                return Err(McpError::Validation(format!(
                    "You already have a server named '{name}'"
                )));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            user_id,
            server_name = %record.name,
            kind = %record.kind.as_str(),
            "Server added"
        );

        if record.enabled {
            self.register_with_cli(&record).await;
        }

        Ok(record)
    }

    /// List a user's servers with template metadata, ordered by name.
    ///
    /// # Errors
    ///
    /// Storage failures propagate; an unreachable database is never
    /// reported as "no servers".
    pub async fn user_servers(&self, user_id: i64) -> Result<Vec<ServerOverview>, McpError> {
        let servers = self.repos.servers.list(user_id).await?;
        Ok(servers
            .into_iter()
            .map(|server| ServerOverview {
                template: templates::info(server.kind),
                server,
            })
            .collect())
    }

    /// Get one of a user's servers by name.
    ///
    /// # Errors
    ///
    /// - `ServerNotFound` if the user has no server with the given name
    /// - `Repository` for storage errors
    pub async fn get_server(&self, user_id: i64, name: &str) -> Result<ServerRecord, McpError> {
        match self.repos.servers.get(user_id, name).await {
            Ok(record) => Ok(record),
            Err(RepositoryError::NotFound(_)) => Err(McpError::ServerNotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a server: deregister from the CLI, remove the stored row,
    /// drop its cached status, and clear the active context if it points
    /// at this server.
    ///
    /// Deregistration is best-effort; deletion proceeds even when the CLI
    /// refuses or is unreachable.
    ///
    /// # Errors
    ///
    /// - `ServerNotFound` if the user has no server with the given name
    /// - `Repository` for storage errors
    pub async fn remove_server(&self, user_id: i64, name: &str) -> Result<(), McpError> {
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let record = self.get_server(user_id, name).await?;

        self.deregister_from_cli(&record).await;

        self.repos.servers.delete(user_id, name).await?;
        self.cache.invalidate(user_id, name).await;

        match self.repos.contexts.get(user_id).await {
            Ok(Some(context)) if context.server_name == name => {
                self.repos.contexts.clear(user_id).await?;
                tracing::info!(user_id, server_name = %name, "Active context cleared with server");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to check active context on removal");
            }
        }

        tracing::info!(user_id, server_name = %name, "Server removed");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Enable / disable
    // ─────────────────────────────────────────────────────────────────────

    /// Enable a server: register it with the CLI, then flip the stored flag.
    ///
    /// Enabling fails loud: if the CLI rejects the registration or is
    /// unreachable the stored flag stays off, so storage never claims a
    /// server is live that the CLI does not know about.
    ///
    /// # Errors
    ///
    /// - `ServerNotFound` if the user has no server with the given name
    /// - `Command` if the CLI rejects the registration or cannot be run
    /// - `Repository` for storage errors
    pub async fn enable_server(&self, user_id: i64, name: &str) -> Result<(), McpError> {
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let record = self.get_server(user_id, name).await?;
        let env = env_pairs(&record);

        let accepted = self
            .probe
            .register(user_id, &record.name, &env, &record.launch_argv())
            .await
            .map_err(|e| McpError::Command(e.to_string()))?;
        if !accepted {
            return Err(McpError::Command(format!(
                "CLI rejected registration of '{name}'"
            )));
        }

        self.repos.servers.set_enabled(user_id, name, true).await?;
        self.cache.invalidate(user_id, name).await;

        tracing::info!(user_id, server_name = %name, "Server enabled");
        Ok(())
    }

    /// Disable a server: deregister from the CLI, then flip the stored flag.
    ///
    /// Disabling is best-effort on the CLI side: the flag is cleared even
    /// when deregistration fails, since a disabled row that the CLI still
    /// holds is repaired by reconciliation, while an enabled row the user
    /// asked to disable is a policy violation.
    ///
    /// # Errors
    ///
    /// - `ServerNotFound` if the user has no server with the given name
    /// - `Repository` for storage errors
    pub async fn disable_server(&self, user_id: i64, name: &str) -> Result<(), McpError> {
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let record = self.get_server(user_id, name).await?;

        self.deregister_from_cli(&record).await;

        self.repos.servers.set_enabled(user_id, name, false).await?;
        self.cache.invalidate(user_id, name).await;

        tracing::info!(user_id, server_name = %name, "Server disabled");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Status
    // ─────────────────────────────────────────────────────────────────────

    /// Get a server's operational status, from cache when fresh.
    ///
    /// Probe failures degrade to an `Error`-state status rather than an
    /// `Err`: a broken CLI must not make stored configuration unreadable.
    /// Error observations are not cached, so the next read retries.
    ///
    /// # Errors
    ///
    /// - `ServerNotFound` if the user has no server with the given name
    /// - `Repository` for storage errors
    pub async fn server_status(&self, user_id: i64, name: &str) -> Result<ServerStatus, McpError> {
        let record = self.get_server(user_id, name).await?;

        if let Some(status) = self.cache.get(user_id, name).await {
            return Ok(status);
        }

        let started = std::time::Instant::now();
        let probed = match self.probe.list_servers(user_id).await {
            Ok(servers) => servers,
            Err(e) => {
                tracing::warn!(user_id, server_name = %name, error = %e, "Status probe failed");
                return Ok(ServerStatus::error(name, e.to_string()));
            }
        };
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let status = match probed.into_iter().find(|s| s.name == record.name) {
            Some(entry) => {
                let mut status = ServerStatus::observed(&record.name, entry.state);
                if entry.state == ServerState::Error && !entry.details.is_empty() {
                    status.error_message = Some(entry.details);
                }
                status.with_response_time(elapsed_ms)
            }
            // Not registered with the CLI at all.
            None => ServerStatus::observed(&record.name, ServerState::Inactive)
                .with_response_time(elapsed_ms),
        };

        self.cache.put(user_id, status.clone()).await;
        Ok(status)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Usage
    // ─────────────────────────────────────────────────────────────────────

    /// Append a usage record, fire-and-forget.
    ///
    /// Accounting must never block or fail a primary operation, so
    /// storage failures are logged and swallowed.
    pub async fn log_usage(&self, record: NewUsageRecord) {
        if let Err(e) = self.repos.usage.append(record).await {
            tracing::warn!(error = %e, "Failed to append usage record");
        }
    }

    /// List a user's most recent usage records.
    ///
    /// # Errors
    ///
    /// - `Repository` for storage errors
    pub async fn recent_usage(
        &self,
        user_id: i64,
        limit: u32,
    ) -> Result<Vec<UsageRecord>, McpError> {
        Ok(self.repos.usage.recent(user_id, limit).await?)
    }

    /// Aggregate a user's usage over the last `days` days.
    ///
    /// # Errors
    ///
    /// - `Repository` for storage errors
    pub async fn usage_stats(&self, user_id: i64, days: u32) -> Result<UsageStats, McpError> {
        Ok(self.repos.usage.stats(user_id, days).await?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reconciliation
    // ─────────────────────────────────────────────────────────────────────

    /// Re-align the CLI's registry with stored configuration.
    ///
    /// Registers enabled servers missing from the CLI and deregisters
    /// disabled ones still present. CLI entries with no stored row are
    /// left alone; they may belong to another tool.
    ///
    /// # Errors
    ///
    /// - `Command` if the CLI cannot be listed at all
    /// - `Repository` for storage errors
    pub async fn reconcile(&self, user_id: i64) -> Result<ReconcileReport, McpError> {
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let stored = self.repos.servers.list(user_id).await?;
        let present: Vec<String> = self
            .probe
            .list_servers(user_id)
            .await
            .map_err(|e| McpError::Command(e.to_string()))?
            .into_iter()
            .map(|s| s.name)
            .collect();

        let mut report = ReconcileReport::default();

        for record in &stored {
            let registered = present.contains(&record.name);
            if record.enabled && !registered {
                if self.register_with_cli(record).await {
                    report.registered.push(record.name.clone());
                }
            } else if !record.enabled && registered {
                if self.deregister_from_cli(record).await {
                    report.removed.push(record.name.clone());
                }
            }
        }

        if !report.is_clean() {
            self.cache.invalidate_user(user_id).await;
            tracing::info!(
                user_id,
                registered = report.registered.len(),
                removed = report.removed.len(),
                "Reconciliation applied changes"
            );
        }

        Ok(report)
    }

    // ─────────────────────────────────────────────────────────────────────
    // CLI bridge helpers
    // ─────────────────────────────────────────────────────────────────────

    async fn register_with_cli(&self, record: &ServerRecord) -> bool {
        let env = env_pairs(record);
        match self
            .probe
            .register(record.user_id, &record.name, &env, &record.launch_argv())
            .await
        {
            Ok(true) => true,
            Ok(false) => {
                tracing::warn!(
                    user_id = record.user_id,
                    server_name = %record.name,
                    "CLI rejected registration"
                );
                false
            }
            Err(e) => {
                tracing::warn!(
                    user_id = record.user_id,
                    server_name = %record.name,
                    error = %e,
                    "CLI registration failed"
                );
                false
            }
        }
    }

    async fn deregister_from_cli(&self, record: &ServerRecord) -> bool {
        match self.probe.deregister(record.user_id, &record.name).await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(
                    user_id = record.user_id,
                    server_name = %record.name,
                    error = %e,
                    "CLI deregistration failed"
                );
                false
            }
        }
    }
}

fn env_pairs(record: &ServerRecord) -> Vec<(String, String)> {
    record
        .env
        .iter()
        .map(|e| (e.key.clone(), e.value.clone()))
        .collect()
}
