//! `SQLite` implementation of the usage log repository.
//!
//! The usage log is append-only. Aggregation happens in SQL over a
//! rolling day window; server deletion does not touch these rows, so
//! historical reporting stays intact.

use async_trait::async_trait;
use sqlx::SqlitePool;

use mcplane_core::domain::{NewUsageRecord, ServerUsage, UsageRecord, UsageStats};
use mcplane_core::ports::{RepositoryError, UsageRepository};

use super::{map_sqlx_error, parse_datetime};

/// `SQLite` implementation of the usage log repository.
pub struct SqliteUsageRepository {
    pool: SqlitePool,
}

impl SqliteUsageRepository {
    /// Create a new `SQLite` usage repository.
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UsageRow {
    id: i64,
    user_id: i64,
    server_name: String,
    query: String,
    response_time_ms: i64,
    success: bool,
    error_message: Option<String>,
    cost: f64,
    session_id: Option<String>,
    created_at: String,
}

impl UsageRow {
    #[allow(clippy::cast_sign_loss)]
    fn into_domain(self) -> UsageRecord {
        UsageRecord {
            id: self.id,
            user_id: self.user_id,
            server_name: self.server_name,
            query: self.query,
            response_time_ms: self.response_time_ms.max(0) as u64,
            success: self.success,
            error_message: self.error_message,
            cost: self.cost,
            session_id: self.session_id,
            created_at: parse_datetime(&self.created_at),
        }
    }
}

#[derive(sqlx::FromRow)]
struct TotalsRow {
    total_queries: i64,
    servers_used: i64,
    success_count: i64,
    avg_response_time_ms: Option<f64>,
    total_cost: Option<f64>,
}

#[derive(sqlx::FromRow)]
struct BreakdownRow {
    server_name: String,
    query_count: i64,
    success_count: i64,
    avg_response_time_ms: Option<f64>,
    total_cost: Option<f64>,
}

#[async_trait]
impl UsageRepository for SqliteUsageRepository {
    async fn append(&self, record: NewUsageRecord) -> Result<(), RepositoryError> {
        #[allow(clippy::cast_possible_wrap)]
        let response_time_ms = record.response_time_ms as i64;

        sqlx::query(
            r#"
            INSERT INTO usage_log
                (user_id, server_name, query, response_time_ms, success, error_message, cost, session_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.user_id)
        .bind(&record.server_name)
        .bind(&record.query)
        .bind(response_time_ms)
        .bind(record.success)
        .bind(&record.error_message)
        .bind(record.cost)
        .bind(&record.session_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn recent(&self, user_id: i64, limit: u32) -> Result<Vec<UsageRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, UsageRow>(
            r#"
            SELECT id, user_id, server_name, query, response_time_ms, success,
                   error_message, cost, session_id, created_at
            FROM usage_log WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(UsageRow::into_domain).collect())
    }

    #[allow(clippy::cast_sign_loss)]
    async fn stats(&self, user_id: i64, days: u32) -> Result<UsageStats, RepositoryError> {
        let window = format!("-{days} days");

        let totals = sqlx::query_as::<_, TotalsRow>(
            r#"
            SELECT COUNT(*) AS total_queries,
                   COUNT(DISTINCT server_name) AS servers_used,
                   COALESCE(SUM(success), 0) AS success_count,
                   AVG(response_time_ms) AS avg_response_time_ms,
                   SUM(cost) AS total_cost
            FROM usage_log
            WHERE user_id = ? AND created_at >= datetime('now', ?)
            "#,
        )
        .bind(user_id)
        .bind(&window)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if totals.total_queries == 0 {
            return Ok(UsageStats::empty(days));
        }

        let breakdown = sqlx::query_as::<_, BreakdownRow>(
            r#"
            SELECT server_name,
                   COUNT(*) AS query_count,
                   COALESCE(SUM(success), 0) AS success_count,
                   AVG(response_time_ms) AS avg_response_time_ms,
                   SUM(cost) AS total_cost
            FROM usage_log
            WHERE user_id = ? AND created_at >= datetime('now', ?)
            GROUP BY server_name
            ORDER BY query_count DESC
            "#,
        )
        .bind(user_id)
        .bind(&window)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(UsageStats {
            days,
            total_queries: totals.total_queries as u64,
            servers_used: totals.servers_used as u64,
            success_count: totals.success_count as u64,
            avg_response_time_ms: totals.avg_response_time_ms.unwrap_or(0.0),
            total_cost: totals.total_cost.unwrap_or(0.0),
            by_server: breakdown
                .into_iter()
                .map(|row| ServerUsage {
                    server_name: row.server_name,
                    query_count: row.query_count as u64,
                    success_count: row.success_count as u64,
                    avg_response_time_ms: row.avg_response_time_ms.unwrap_or(0.0),
                    total_cost: row.total_cost.unwrap_or(0.0),
                })
                .collect(),
        })
    }
}
