//! `SQLite` implementation of the server configuration repository.
//!
//! Server rows hold the launch triple with args and the free-form config
//! map JSON-encoded. Environment variables live in a side table with
//! base64-encoded values (encoding, not encryption - a follow-up task
//! should add proper at-rest protection).

use std::collections::HashMap;

use async_trait::async_trait;
use base64::Engine;
use sqlx::SqlitePool;

use mcplane_core::domain::{EnvEntry, NewServer, ServerKind, ServerRecord};
use mcplane_core::ports::{RepositoryError, ServerRepository};

use super::{map_sqlx_error, parse_datetime};

/// `SQLite` implementation of the server configuration repository.
pub struct SqliteServerRepository {
    pool: SqlitePool,
}

impl SqliteServerRepository {
    /// Create a new `SQLite` server repository.
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal row types for database queries
// ─────────────────────────────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct ServerRow {
    id: i64,
    user_id: i64,
    name: String,
    kind: String,
    command: String,
    args: String,
    config: String,
    enabled: bool,
    created_at: String,
}

#[derive(sqlx::FromRow)]
struct EnvRow {
    key: String,
    value: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper functions
// ─────────────────────────────────────────────────────────────────────────────

/// Convert a `ServerRow` (with env) to a domain `ServerRecord`.
fn row_to_record(row: ServerRow, env: Vec<EnvEntry>) -> Result<ServerRecord, RepositoryError> {
    let kind = ServerKind::parse(&row.kind)
        .ok_or_else(|| RepositoryError::Internal(format!("Unknown server kind: {}", row.kind)))?;

    let args: Vec<String> = serde_json::from_str(&row.args).unwrap_or_default();
    let config: HashMap<String, String> = serde_json::from_str(&row.config).unwrap_or_default();

    Ok(ServerRecord {
        id: row.id,
        user_id: row.user_id,
        name: row.name,
        kind,
        command: row.command,
        args,
        env,
        config,
        enabled: row.enabled,
        created_at: parse_datetime(&row.created_at),
    })
}

/// Decode a base64-encoded environment variable value.
fn decode_env_value(encoded: &str) -> Result<String, RepositoryError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| RepositoryError::Internal(format!("Failed to decode env var: {e}")))?;

    String::from_utf8(bytes)
        .map_err(|e| RepositoryError::Internal(format!("Invalid UTF-8 in env var: {e}")))
}

/// Encode an environment variable value to base64.
fn encode_env_value(value: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(value.as_bytes())
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ServerRepository for SqliteServerRepository {
    async fn insert(&self, server: NewServer) -> Result<ServerRecord, RepositoryError> {
        let args_json =
            serde_json::to_string(&server.args).unwrap_or_else(|_| "[]".to_string());
        let config_json =
            serde_json::to_string(&server.config).unwrap_or_else(|_| "{}".to_string());

        let result = sqlx::query(
            r#"
            INSERT INTO mcp_servers (user_id, name, kind, command, args, config, enabled)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(server.user_id)
        .bind(&server.name)
        .bind(server.kind.as_str())
        .bind(&server.command)
        .bind(&args_json)
        .bind(&config_json)
        .bind(server.enabled)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let server_id = result.last_insert_rowid();

        for entry in &server.env {
            sqlx::query("INSERT INTO mcp_server_env (server_id, key, value) VALUES (?, ?, ?)")
                .bind(server_id)
                .bind(&entry.key)
                .bind(encode_env_value(&entry.value))
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        }

        // Fetch and return the complete record
        self.get(server.user_id, &server.name).await
    }

    async fn get(&self, user_id: i64, name: &str) -> Result<ServerRecord, RepositoryError> {
        let row = sqlx::query_as::<_, ServerRow>(
            r#"
            SELECT id, user_id, name, kind, command, args, config, enabled, created_at
            FROM mcp_servers WHERE user_id = ? AND name = ?
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| RepositoryError::NotFound(name.to_string()))?;

        let env = self.fetch_env(row.id).await?;

        row_to_record(row, env)
    }

    async fn list(&self, user_id: i64) -> Result<Vec<ServerRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, ServerRow>(
            r#"
            SELECT id, user_id, name, kind, command, args, config, enabled, created_at
            FROM mcp_servers WHERE user_id = ? ORDER BY name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut servers = Vec::with_capacity(rows.len());
        for row in rows {
            let env = self.fetch_env(row.id).await?;
            servers.push(row_to_record(row, env)?);
        }

        Ok(servers)
    }

    async fn set_enabled(
        &self,
        user_id: i64,
        name: &str,
        enabled: bool,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE mcp_servers SET enabled = ? WHERE user_id = ? AND name = ?")
                .bind(enabled)
                .bind(user_id)
                .bind(name)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(name.to_string()));
        }

        Ok(())
    }

    async fn delete(&self, user_id: i64, name: &str) -> Result<(), RepositoryError> {
        // Env vars are deleted via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM mcp_servers WHERE user_id = ? AND name = ?")
            .bind(user_id)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(name.to_string()));
        }

        Ok(())
    }
}

impl SqliteServerRepository {
    /// Fetch and decode environment variables for a server.
    async fn fetch_env(&self, server_id: i64) -> Result<Vec<EnvEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, EnvRow>(
            "SELECT key, value FROM mcp_server_env WHERE server_id = ?",
        )
        .bind(server_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut env = Vec::with_capacity(rows.len());
        for row in rows {
            env.push(EnvEntry::new(row.key, decode_env_value(&row.value)?));
        }

        Ok(env)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
