//! `SQLite` implementation of the active-context repository.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::SqlitePool;

use mcplane_core::domain::ActiveContext;
use mcplane_core::ports::{ContextRepository, RepositoryError};

use super::{map_sqlx_error, parse_datetime};

/// `SQLite` implementation of the active-context repository.
pub struct SqliteContextRepository {
    pool: SqlitePool,
}

impl SqliteContextRepository {
    /// Create a new `SQLite` context repository.
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ContextRow {
    user_id: i64,
    server_name: String,
    settings: String,
    selected_at: String,
}

impl ContextRow {
    fn into_domain(self) -> ActiveContext {
        let settings: HashMap<String, String> =
            serde_json::from_str(&self.settings).unwrap_or_default();
        ActiveContext {
            user_id: self.user_id,
            server_name: self.server_name,
            settings,
            selected_at: parse_datetime(&self.selected_at),
        }
    }
}

#[async_trait]
impl ContextRepository for SqliteContextRepository {
    async fn set(&self, context: &ActiveContext) -> Result<(), RepositoryError> {
        let settings_json =
            serde_json::to_string(&context.settings).unwrap_or_else(|_| "{}".to_string());

        // One row per user; a new selection replaces the old one.
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO active_contexts (user_id, server_name, settings, selected_at)
            VALUES (?, ?, ?, datetime('now'))
            "#,
        )
        .bind(context.user_id)
        .bind(&context.server_name)
        .bind(&settings_json)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn get(&self, user_id: i64) -> Result<Option<ActiveContext>, RepositoryError> {
        let row = sqlx::query_as::<_, ContextRow>(
            "SELECT user_id, server_name, settings, selected_at FROM active_contexts WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ContextRow::into_domain))
    }

    async fn clear(&self, user_id: i64) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM active_contexts WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}
