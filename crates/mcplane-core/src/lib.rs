//! Domain types, template registry, and port definitions for mcplane.
//!
//! This crate holds everything the rest of the workspace agrees on:
//! the persisted data model, the setup-template registry for supported
//! server kinds, the trait abstractions (ports) that infrastructure
//! crates implement, and the service-level error taxonomy. It contains
//! no sqlx types and spawns no processes.
#![deny(unsafe_code)]

pub mod domain;
pub mod error;
pub mod paths;
pub mod ports;
pub mod templates;

// Re-export commonly used types for convenience
pub use domain::{
    ActiveContext, EnvEntry, NewServer, NewUsageRecord, ServerKind, ServerRecord, ServerState,
    ServerStatus, ServerUsage, UsageRecord, UsageStats,
};
pub use error::McpError;
pub use ports::{
    CliOutput, CliRunner, CliRunnerError, ContextRepository, ProbedServer, Repos, RepositoryError,
    ServerRepository, ServerStatusProbe, UsageRepository,
};
pub use templates::{InputKind, SetupStep, TemplateInfo};
