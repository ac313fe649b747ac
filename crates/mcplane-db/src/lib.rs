//! SQLite persistence for mcplane.
//!
//! Implements the repository ports from `mcplane-core` over a sqlx
//! `SqlitePool`: per-user server configurations (with a base64-encoded
//! env side table), the active-context pointer, and the append-only
//! usage log. `setup_database` creates the full schema idempotently.
#![deny(unsafe_code)]

pub mod factory;
pub mod repositories;
pub mod setup;

pub use factory::build_repos;
pub use repositories::{
    SqliteContextRepository, SqliteServerRepository, SqliteUsageRepository,
};
pub use setup::setup_database;

#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
