//! Repository factory.
//!
//! Builds the `Repos` container from a connection pool so adapters wire
//! storage in one call without naming concrete repository types.

use std::sync::Arc;

use sqlx::SqlitePool;

use mcplane_core::ports::Repos;

use crate::repositories::{
    SqliteContextRepository, SqliteServerRepository, SqliteUsageRepository,
};

/// Build all repositories over the given pool.
#[must_use]
pub fn build_repos(pool: &SqlitePool) -> Repos {
    Repos::new(
        Arc::new(SqliteServerRepository::new(pool.clone())),
        Arc::new(SqliteContextRepository::new(pool.clone())),
        Arc::new(SqliteUsageRepository::new(pool.clone())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;

    #[tokio::test]
    async fn test_build_repos() {
        let pool = setup_test_database().await.unwrap();
        let repos = build_repos(&pool);

        assert!(repos.servers.list(1).await.unwrap().is_empty());
        assert!(repos.contexts.get(1).await.unwrap().is_none());
    }
}
