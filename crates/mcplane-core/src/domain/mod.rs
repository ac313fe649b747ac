//! Domain data model.
//!
//! Plain data types shared across the workspace. Persisted entities live
//! here; ephemeral observations (status) are separate types that are never
//! treated as a source of truth.

pub mod context;
pub mod server;
pub mod status;
pub mod usage;

pub use context::ActiveContext;
pub use server::{EnvEntry, NewServer, ServerKind, ServerRecord};
pub use status::{ServerState, ServerStatus};
pub use usage::{NewUsageRecord, ServerUsage, UsageRecord, UsageStats};
