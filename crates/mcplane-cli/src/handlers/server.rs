//! Server management handlers.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::presentation::{print_separator, truncate_string};

use super::{parse_inputs, parse_kind};

/// Add a server from a template.
pub async fn add(
    ctx: &CliContext,
    user: i64,
    name: &str,
    kind_tag: &str,
    input_pairs: &[String],
    json: bool,
) -> Result<()> {
    let kind = parse_kind(kind_tag)?;
    let inputs = parse_inputs(input_pairs)?;

    let record = ctx.manager.add_server(user, name, kind, &inputs).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("Added server '{}' ({}).", record.name, record.kind.as_str());
    if record.enabled {
        println!("Registered with the external CLI; run 'mcplane server status {name}' to check it.");
    }
    Ok(())
}

/// List the user's servers.
pub async fn list(ctx: &CliContext, user: i64, json: bool) -> Result<()> {
    let servers = ctx.manager.user_servers(user).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&servers)?);
        return Ok(());
    }

    if servers.is_empty() {
        println!("No servers configured.");
        println!("Use 'mcplane template list' to see what you can add.");
        return Ok(());
    }

    println!("Found {} server(s):\n", servers.len());
    println!(
        "{:<20} {:<12} {:<9} {:<20} Command",
        "Name", "Kind", "Enabled", "Added"
    );
    print_separator(90);
    for overview in servers {
        let server = &overview.server;
        println!(
            "{:<20} {:<12} {:<9} {:<20} {}",
            truncate_string(&server.name, 19),
            server.kind.as_str(),
            if server.enabled { "yes" } else { "no" },
            server.created_at.format("%Y-%m-%d %H:%M:%S"),
            truncate_string(&server.launch_argv().join(" "), 40)
        );
    }
    Ok(())
}

/// Remove a server.
pub async fn remove(ctx: &CliContext, user: i64, name: &str) -> Result<()> {
    ctx.manager.remove_server(user, name).await?;
    println!("Removed server '{name}'.");
    Ok(())
}

/// Enable a server.
pub async fn enable(ctx: &CliContext, user: i64, name: &str) -> Result<()> {
    ctx.manager.enable_server(user, name).await?;
    println!("Enabled server '{name}'.");
    Ok(())
}

/// Disable a server.
pub async fn disable(ctx: &CliContext, user: i64, name: &str) -> Result<()> {
    ctx.manager.disable_server(user, name).await?;
    println!("Disabled server '{name}'.");
    Ok(())
}

/// Show a server's operational status.
pub async fn status(ctx: &CliContext, user: i64, name: &str, json: bool) -> Result<()> {
    let status = ctx.manager.server_status(user, name).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("Server:     {}", status.name);
    println!("State:      {}", status.state);
    println!(
        "Checked:    {}",
        status.last_check.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(ms) = status.response_time_ms {
        println!("Probe time: {ms} ms");
    }
    if let Some(ref message) = status.error_message {
        println!("Error:      {message}");
    }
    Ok(())
}
