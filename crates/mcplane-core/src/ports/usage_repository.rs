//! Usage log repository trait.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{NewUsageRecord, UsageRecord, UsageStats};

/// Repository trait for the append-only usage log.
#[async_trait]
pub trait UsageRepository: Send + Sync {
    /// Append one usage record.
    ///
    /// # Errors
    ///
    /// - `Internal` for storage errors
    async fn append(&self, record: NewUsageRecord) -> Result<(), RepositoryError>;

    /// List a user's most recent usage records, newest first.
    ///
    /// # Errors
    ///
    /// - `Internal` for storage errors
    async fn recent(&self, user_id: i64, limit: u32) -> Result<Vec<UsageRecord>, RepositoryError>;

    /// Aggregate a user's usage over the last `days` days.
    ///
    /// Returns overall totals plus a per-server breakdown ordered by
    /// query count descending.
    ///
    /// # Errors
    ///
    /// - `Internal` for storage errors
    async fn stats(&self, user_id: i64, days: u32) -> Result<UsageStats, RepositoryError>;
}
