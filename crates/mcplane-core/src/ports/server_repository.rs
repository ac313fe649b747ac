//! Server configuration repository trait.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{NewServer, ServerRecord};

/// Repository trait for per-user server configuration persistence.
///
/// # Design Rules
///
/// - Environment variables are embedded in `ServerRecord` - no separate env API
/// - Constraint: unique `name` per owning user
/// - All lookups are scoped by `user_id`; no cross-user reads
#[async_trait]
pub trait ServerRepository: Send + Sync {
    /// Insert a new server configuration.
    ///
    /// Returns the record with its assigned ID and creation timestamp.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the user already has a server with the same name
    /// - `Internal` for storage errors
    async fn insert(&self, server: NewServer) -> Result<ServerRecord, RepositoryError>;

    /// Get one of a user's servers by name.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user has no server with the given name
    /// - `Internal` for storage errors
    async fn get(&self, user_id: i64, name: &str) -> Result<ServerRecord, RepositoryError>;

    /// List all of a user's servers, ordered by name.
    ///
    /// # Errors
    ///
    /// - `Internal` for storage errors
    async fn list(&self, user_id: i64) -> Result<Vec<ServerRecord>, RepositoryError>;

    /// Set the enabled flag on one of a user's servers.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user has no server with the given name
    /// - `Internal` for storage errors
    async fn set_enabled(
        &self,
        user_id: i64,
        name: &str,
        enabled: bool,
    ) -> Result<(), RepositoryError>;

    /// Delete one of a user's servers.
    ///
    /// Environment variables are removed with the row.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user has no server with the given name
    /// - `Internal` for storage errors
    async fn delete(&self, user_id: i64, name: &str) -> Result<(), RepositoryError>;
}
