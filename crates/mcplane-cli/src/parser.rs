//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface definition for the MCP control-plane tool.
///
/// This is the top-level parser that handles global options and dispatches
/// to subcommands.
#[derive(Parser)]
#[command(name = "mcplane")]
#[command(about = "Manage per-user MCP servers over the Claude CLI")]
#[command(version)]
pub struct Cli {
    /// User ID to operate as
    #[arg(long = "user", global = true, env = "MCPLANE_USER", default_value = "0")]
    pub user: i64,

    /// Emit machine-readable JSON instead of tables
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from(["mcplane", "--user", "42", "--json", "server", "list"]);
        assert_eq!(cli.user, 42);
        assert!(cli.json);
    }
}
