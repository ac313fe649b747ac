//! Main commands enum and primary subcommands.
//!
//! This module defines the available commands for the CLI tool.

use clap::Subcommand;

/// Available commands for the MCP control-plane tool.
#[derive(Subcommand)]
pub enum Commands {
    /// Inspect the built-in server templates
    Template {
        #[command(subcommand)]
        command: TemplateCommand,
    },

    /// Manage your MCP server configurations
    Server {
        #[command(subcommand)]
        command: ServerCommand,
    },

    /// Manage the active server context
    Context {
        #[command(subcommand)]
        command: ContextCommand,
    },

    /// Run a query against the active server context
    Query {
        /// The query text; omit to continue the previous conversation
        prompt: Option<String>,
        /// Working directory for the query
        #[arg(long)]
        dir: Option<String>,
        /// Session ID to resume
        #[arg(long)]
        session: Option<String>,
    },

    /// Show usage statistics
    Stats {
        /// Rolling window in days
        #[arg(long, default_value = "7")]
        days: u32,
        /// Also list the N most recent queries
        #[arg(long)]
        recent: Option<u32>,
    },

    /// Re-align the external CLI registry with stored configuration
    Reconcile,
}

/// Template inspection subcommands.
#[derive(Subcommand)]
pub enum TemplateCommand {
    /// List all available templates
    List,
    /// Show the setup steps for one template kind
    Steps {
        /// Template kind (github, filesystem, postgres, sqlite, git, playwright)
        kind: String,
    },
}

/// Server management subcommands.
#[derive(Subcommand)]
pub enum ServerCommand {
    /// Add a server from a template
    Add {
        /// Name for the new server (unique per user)
        name: String,
        /// Template kind (github, filesystem, postgres, sqlite, git, playwright)
        kind: String,
        /// Template inputs as key=value pairs (see `template steps <kind>`)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        inputs: Vec<String>,
    },
    /// List your servers
    List,
    /// Remove a server
    Remove {
        /// Server name
        name: String,
    },
    /// Enable a server (registers it with the external CLI)
    Enable {
        /// Server name
        name: String,
    },
    /// Disable a server (deregisters it from the external CLI)
    Disable {
        /// Server name
        name: String,
    },
    /// Show a server's operational status
    Status {
        /// Server name
        name: String,
    },
}

/// Active-context subcommands.
#[derive(Subcommand)]
pub enum ContextCommand {
    /// Select a server as the active context
    Use {
        /// Server name
        name: String,
    },
    /// Show the active context and recent usage
    Show,
    /// Clear the active context
    Clear,
}
