//! Active-context handlers.

use anyhow::Result;

use crate::bootstrap::CliContext;

/// Select a server as the active context.
pub async fn use_server(ctx: &CliContext, user: i64, name: &str) -> Result<()> {
    let context = ctx.context.set_active_context(user, name).await?;
    println!("Active context set to '{}'.", context.server_name);
    Ok(())
}

/// Show the active context and recent usage.
pub async fn show(ctx: &CliContext, user: i64, json: bool) -> Result<()> {
    let summary = ctx.context.context_summary(user).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    match summary.context {
        Some(context) => {
            println!("Active context: {}", context.server_name);
            println!(
                "Selected:       {}",
                context.selected_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            for (key, value) in &context.settings {
                println!("  {key} = {value}");
            }
        }
        None => println!("No active context. Use 'mcplane context use <name>'."),
    }

    let stats = &summary.stats;
    println!();
    println!(
        "Last {} days: {} queries ({} ok) across {} server(s), ${:.4} total",
        stats.days, stats.total_queries, stats.success_count, stats.servers_used, stats.total_cost
    );
    Ok(())
}

/// Clear the active context.
pub async fn clear(ctx: &CliContext, user: i64) -> Result<()> {
    ctx.context.clear_active_context(user).await?;
    println!("Active context cleared.");
    Ok(())
}
