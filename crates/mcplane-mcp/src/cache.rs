//! TTL cache for server status observations.
//!
//! An explicit cache type rather than an ad-hoc map: entries expire after
//! a fixed window and are invalidated eagerly on enable/disable/remove.
//! The cache is internally locked; the absence of cross-operation locking
//! is the manager's concern, not this type's.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};

use mcplane_core::domain::ServerStatus;

/// Default freshness window for cached statuses.
pub const DEFAULT_STATUS_TTL: Duration = Duration::from_secs(300);

struct Entry {
    status: ServerStatus,
    inserted_at: Instant,
}

/// In-process status cache keyed by (user, server name).
pub struct StatusCache {
    ttl: Duration,
    entries: RwLock<HashMap<(i64, String), Entry>>,
}

impl StatusCache {
    /// Create a cache with the given freshness window.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Get a fresh cached status, if one exists.
    ///
    /// Entries older than the TTL are treated as absent (and left for the
    /// next `put` to overwrite).
    pub async fn get(&self, user_id: i64, name: &str) -> Option<ServerStatus> {
        let entries = self.entries.read().await;
        let entry = entries.get(&(user_id, name.to_string()))?;

        if entry.inserted_at.elapsed() > self.ttl {
            return None;
        }

        Some(entry.status.clone())
    }

    /// Store a fresh observation.
    pub async fn put(&self, user_id: i64, status: ServerStatus) {
        let mut entries = self.entries.write().await;
        entries.insert(
            (user_id, status.name.clone()),
            Entry {
                status,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop the cached status for one server.
    pub async fn invalidate(&self, user_id: i64, name: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(&(user_id, name.to_string()));
    }

    /// Drop all cached statuses for one user.
    pub async fn invalidate_user(&self, user_id: i64) {
        let mut entries = self.entries.write().await;
        entries.retain(|(uid, _), _| *uid != user_id);
    }
}

impl Default for StatusCache {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcplane_core::domain::ServerState;

    #[tokio::test(start_paused = true)]
    async fn test_entry_fresh_within_ttl() {
        let cache = StatusCache::default();
        cache
            .put(1, ServerStatus::observed("fs", ServerState::Active))
            .await;

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(cache.get(1, "fs").await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = StatusCache::default();
        cache
            .put(1, ServerStatus::observed("fs", ServerState::Active))
            .await;

        tokio::time::advance(Duration::from_secs(301)).await;
        assert!(cache.get(1, "fs").await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_single_entry() {
        let cache = StatusCache::default();
        cache
            .put(1, ServerStatus::observed("fs", ServerState::Active))
            .await;
        cache
            .put(1, ServerStatus::observed("gh", ServerState::Active))
            .await;

        cache.invalidate(1, "fs").await;

        assert!(cache.get(1, "fs").await.is_none());
        assert!(cache.get(1, "gh").await.is_some());
    }

    #[tokio::test]
    async fn test_keys_are_user_scoped() {
        let cache = StatusCache::default();
        cache
            .put(1, ServerStatus::observed("fs", ServerState::Active))
            .await;

        assert!(cache.get(2, "fs").await.is_none());

        cache.invalidate_user(1).await;
        assert!(cache.get(1, "fs").await.is_none());
    }
}
