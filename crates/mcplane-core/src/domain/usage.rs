//! Usage accounting types.
//!
//! Usage records are append-only: one row per query execution against a
//! server context. They reference servers by name and survive server
//! deletion so aggregate reporting stays intact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A usage record to be appended (no ID yet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUsageRecord {
    /// User who issued the query.
    pub user_id: i64,

    /// Server context the query ran against.
    pub server_name: String,

    /// The query text.
    pub query: String,

    /// Wall-clock execution time in milliseconds.
    pub response_time_ms: u64,

    /// Whether the execution succeeded.
    pub success: bool,

    /// Failure detail when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Reported cost of the execution in USD.
    pub cost: f64,

    /// Conversation correlation ID, if the CLI returned one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl NewUsageRecord {
    /// Create a successful usage record.
    pub fn success(
        user_id: i64,
        server_name: impl Into<String>,
        query: impl Into<String>,
        response_time_ms: u64,
        cost: f64,
    ) -> Self {
        Self {
            user_id,
            server_name: server_name.into(),
            query: query.into(),
            response_time_ms,
            success: true,
            error_message: None,
            cost,
            session_id: None,
        }
    }

    /// Create a failed usage record.
    pub fn failure(
        user_id: i64,
        server_name: impl Into<String>,
        query: impl Into<String>,
        response_time_ms: u64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            server_name: server_name.into(),
            query: query.into(),
            response_time_ms,
            success: false,
            error_message: Some(error.into()),
            cost: 0.0,
            session_id: None,
        }
    }

    /// Attach the session correlation ID.
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// A persisted usage record. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Database ID.
    pub id: i64,
    /// User who issued the query.
    pub user_id: i64,
    /// Server context the query ran against.
    pub server_name: String,
    /// The query text.
    pub query: String,
    /// Wall-clock execution time in milliseconds.
    pub response_time_ms: u64,
    /// Whether the execution succeeded.
    pub success: bool,
    /// Failure detail when `success` is false.
    pub error_message: Option<String>,
    /// Reported cost of the execution in USD.
    pub cost: f64,
    /// Conversation correlation ID.
    pub session_id: Option<String>,
    /// When the record was written.
    pub created_at: DateTime<Utc>,
}

/// Per-server slice of a usage aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerUsage {
    /// Server name.
    pub server_name: String,
    /// Number of queries in the window.
    pub query_count: u64,
    /// Number of successful queries.
    pub success_count: u64,
    /// Average response time in milliseconds.
    pub avg_response_time_ms: f64,
    /// Total cost in USD.
    pub total_cost: f64,
}

/// Aggregate usage statistics over a rolling window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageStats {
    /// Window size in days.
    pub days: u32,
    /// Total query count.
    pub total_queries: u64,
    /// Number of distinct servers used.
    pub servers_used: u64,
    /// Number of successful queries.
    pub success_count: u64,
    /// Average response time in milliseconds across all queries.
    pub avg_response_time_ms: f64,
    /// Total cost in USD.
    pub total_cost: f64,
    /// Per-server breakdown, ordered by query count descending.
    pub by_server: Vec<ServerUsage>,
}

impl UsageStats {
    /// An empty aggregate for a window with no records.
    #[must_use]
    pub const fn empty(days: u32) -> Self {
        Self {
            days,
            total_queries: 0,
            servers_used: 0,
            success_count: 0,
            avg_response_time_ms: 0.0,
            total_cost: 0.0,
            by_server: Vec::new(),
        }
    }
}
