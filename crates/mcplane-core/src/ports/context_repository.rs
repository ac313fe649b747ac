//! Active-context repository trait.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::ActiveContext;

/// Repository trait for the per-user active-context pointer.
///
/// At most one row per user; setting a new pointer replaces the old one.
#[async_trait]
pub trait ContextRepository: Send + Sync {
    /// Set (or replace) the user's active context.
    ///
    /// # Errors
    ///
    /// - `Internal` for storage errors
    async fn set(&self, context: &ActiveContext) -> Result<(), RepositoryError>;

    /// Get the user's active context, if any.
    ///
    /// # Errors
    ///
    /// - `Internal` for storage errors
    async fn get(&self, user_id: i64) -> Result<Option<ActiveContext>, RepositoryError>;

    /// Clear the user's active context. Clearing an absent pointer is a no-op.
    ///
    /// # Errors
    ///
    /// - `Internal` for storage errors
    async fn clear(&self, user_id: i64) -> Result<(), RepositoryError>;
}
