//! Registry reconciliation handler.

use anyhow::Result;

use crate::bootstrap::CliContext;

/// Re-align the external CLI registry with stored configuration.
pub async fn execute(ctx: &CliContext, user: i64, json: bool) -> Result<()> {
    let report = ctx.manager.reconcile(user).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.is_clean() {
        println!("Registry already matches stored configuration.");
        return Ok(());
    }

    for name in &report.registered {
        println!("Registered missing server '{name}'.");
    }
    for name in &report.removed {
        println!("Deregistered lingering server '{name}'.");
    }
    Ok(())
}
