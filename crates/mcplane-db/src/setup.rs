//! Database setup and initialization.
//!
//! Provides `setup_database()` for initializing the `SQLite` database
//! with the full schema. Entry points call this with the resolved
//! database path.

use std::path::Path;

use anyhow::Result;
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};

/// Sets up the `SQLite` database connection and ensures the schema exists.
///
/// Creates the database file (and parent directory) if missing, then
/// creates all tables and indexes. Safe to call repeatedly.
///
/// # Errors
///
/// Returns an error if the database file cannot be opened or created, or
/// if schema creation fails.
pub async fn setup_database(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let pool = SqlitePool::connect_with(
        SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true),
    )
    .await?;

    create_schema(&pool).await?;

    tracing::debug!(path = %db_path.display(), "Database schema ready");

    Ok(pool)
}

/// Sets up an in-memory `SQLite` database for testing.
///
/// Creates a fresh in-memory database with the full production schema.
#[cfg(any(test, feature = "test-utils"))]
pub async fn setup_test_database() -> Result<SqlitePool> {
    let pool = SqlitePool::connect("sqlite::memory:").await?;
    create_schema(&pool).await?;
    Ok(pool)
}

/// Creates the complete database schema.
///
/// Safe to call multiple times as all operations use IF NOT EXISTS.
async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // Per-user server configurations
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS mcp_servers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('github', 'filesystem', 'postgres', 'sqlite', 'git', 'playwright')),
            command TEXT NOT NULL,
            args TEXT NOT NULL DEFAULT '[]',
            config TEXT NOT NULL DEFAULT '{}',
            enabled INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(user_id, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_mcp_servers_user ON mcp_servers(user_id)")
        .execute(pool)
        .await?;

    // Server environment variables (values base64-encoded)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS mcp_server_env (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            server_id INTEGER NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            FOREIGN KEY (server_id) REFERENCES mcp_servers(id) ON DELETE CASCADE,
            UNIQUE(server_id, key)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_mcp_env_server ON mcp_server_env(server_id)")
        .execute(pool)
        .await?;

    // One active-context pointer per user
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS active_contexts (
            user_id INTEGER PRIMARY KEY,
            server_name TEXT NOT NULL,
            settings TEXT NOT NULL DEFAULT '{}',
            selected_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Append-only usage log
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS usage_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            server_name TEXT NOT NULL,
            query TEXT NOT NULL,
            response_time_ms INTEGER NOT NULL,
            success INTEGER NOT NULL,
            error_message TEXT,
            cost REAL NOT NULL DEFAULT 0,
            session_id TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_usage_user_created ON usage_log(user_id, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
