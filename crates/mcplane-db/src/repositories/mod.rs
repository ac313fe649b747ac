//! Repository implementations over `SQLite`.

mod sqlite_context_repository;
mod sqlite_server_repository;
mod sqlite_usage_repository;

pub use sqlite_context_repository::SqliteContextRepository;
pub use sqlite_server_repository::SqliteServerRepository;
pub use sqlite_usage_repository::SqliteUsageRepository;

use chrono::{DateTime, TimeZone, Utc};
use mcplane_core::ports::RepositoryError;

/// Parse a datetime string from `SQLite` to a `DateTime<Utc>`.
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // `SQLite` stores datetime as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| Utc.from_utc_datetime(&dt))
        .unwrap_or_else(|_| Utc::now())
}

/// Map `SQLx` errors to `RepositoryError`.
pub(crate) fn map_sqlx_error(e: sqlx::Error) -> RepositoryError {
    // Check for unique constraint violations (name conflict)
    let msg = e.to_string();
    if msg.contains("UNIQUE constraint failed") {
        return RepositoryError::Conflict("server name already exists".to_string());
    }
    RepositoryError::Internal(msg)
}
