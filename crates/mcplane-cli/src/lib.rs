//! CLI adapter for mcplane.
//!
//! Parses commands, composes the service stack (bootstrap), and formats
//! output. All logic lives in `mcplane-mcp`; handlers here are thin.
#![deny(unsafe_code)]

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{Commands, ContextCommand, ServerCommand, TemplateCommand};
pub use error::CliError;
pub use parser::Cli;
