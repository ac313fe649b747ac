//! Usage statistics handler.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::presentation::{print_separator, truncate_string};

/// Show usage statistics over a rolling window, optionally listing the
/// most recent queries.
pub async fn execute(
    ctx: &CliContext,
    user: i64,
    days: u32,
    recent: Option<u32>,
    json: bool,
) -> Result<()> {
    let stats = ctx.manager.usage_stats(user, days).await?;

    if json {
        let mut output = serde_json::json!({ "stats": stats });
        if let Some(limit) = recent {
            let records = ctx.manager.recent_usage(user, limit).await?;
            output["recent"] = serde_json::to_value(records)?;
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Usage over the last {} day(s):", stats.days);
    println!("  Queries:        {}", stats.total_queries);
    println!("  Successful:     {}", stats.success_count);
    println!("  Servers used:   {}", stats.servers_used);
    println!("  Avg response:   {:.0} ms", stats.avg_response_time_ms);
    println!("  Total cost:     ${:.4}", stats.total_cost);

    if !stats.by_server.is_empty() {
        println!();
        println!(
            "{:<20} {:<9} {:<9} {:<13} Cost",
            "Server", "Queries", "OK", "Avg ms"
        );
        print_separator(62);
        for server in &stats.by_server {
            println!(
                "{:<20} {:<9} {:<9} {:<13.0} ${:.4}",
                truncate_string(&server.server_name, 19),
                server.query_count,
                server.success_count,
                server.avg_response_time_ms,
                server.total_cost
            );
        }
    }

    if let Some(limit) = recent {
        let records = ctx.manager.recent_usage(user, limit).await?;
        println!();
        println!("Most recent {} quer(ies):", records.len());
        for record in records {
            let outcome = if record.success { "ok" } else { "failed" };
            println!(
                "  {} [{}] {} ({}, {} ms)",
                record.created_at.format("%Y-%m-%d %H:%M"),
                record.server_name,
                truncate_string(&record.query, 40),
                outcome,
                record.response_time_ms
            );
        }
    }
    Ok(())
}
