//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` types in any signature
//! - No process/filesystem implementation details
//! - Repository traits are minimal and CRUD-focused
//! - The status probe is intent-based: callers never see CLI text

pub mod cli_runner;
pub mod context_repository;
pub mod server_repository;
pub mod status_probe;
pub mod usage_repository;

use std::sync::Arc;

use thiserror::Error;

pub use cli_runner::{CliOutput, CliRunner, CliRunnerError};
pub use context_repository::ContextRepository;
pub use server_repository::ServerRepository;
pub use status_probe::{ProbedServer, ServerStatusProbe};
pub use usage_repository::UsageRepository;

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details and
/// provides a clean interface for services to handle storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An entity with the same identity already exists.
    #[error("Already exists: {0}")]
    Conflict(String),

    /// Storage backend error (database, etc.).
    #[error("Storage error: {0}")]
    Internal(String),
}

/// Container for all repository trait objects.
///
/// Provides a consistent way to wire repositories across adapters without
/// coupling them to concrete implementations. It lives in `mcplane-core`
/// so the service crate can accept it without depending on `mcplane-db`.
#[derive(Clone)]
pub struct Repos {
    /// Server configuration repository.
    pub servers: Arc<dyn ServerRepository>,
    /// Active-context repository.
    pub contexts: Arc<dyn ContextRepository>,
    /// Usage log repository.
    pub usage: Arc<dyn UsageRepository>,
}

impl Repos {
    /// Create a new Repos container.
    pub fn new(
        servers: Arc<dyn ServerRepository>,
        contexts: Arc<dyn ContextRepository>,
        usage: Arc<dyn UsageRepository>,
    ) -> Self {
        Self {
            servers,
            contexts,
            usage,
        }
    }
}
