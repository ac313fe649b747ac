//! MCP server management over the external Claude CLI.
//!
//! This crate holds the control plane: the manager (per-user server CRUD
//! bridged to the CLI's own registry plus a TTL status cache), the
//! context handler (active-server pointer and query routing), and the
//! Claude CLI integration (subprocess client and best-effort output
//! parsing). Storage and the probe are injected through the ports
//! defined in `mcplane-core`.
#![deny(unsafe_code)]

pub mod cache;
pub mod claude;
pub mod context;
pub mod manager;

#[cfg(test)]
pub(crate) mod testkit;

// Re-export domain types from core for convenience
pub use mcplane_core::{
    ActiveContext, EnvEntry, McpError, NewServer, ServerKind, ServerRecord, ServerState,
    ServerStatus, UsageStats,
};

// Re-export this crate's public types
pub use cache::StatusCache;
pub use claude::{ClaudeCli, ClaudeIntegration, ClaudeResponse};
pub use context::{ContextHandler, ContextSummary};
pub use manager::{McpManager, ReconcileReport, ServerOverview};
