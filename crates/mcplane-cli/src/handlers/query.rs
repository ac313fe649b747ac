//! Contextual query handler.

use anyhow::Result;

use crate::bootstrap::CliContext;

/// Run a query against the active server context.
///
/// An omitted prompt continues the previous conversation.
pub async fn execute(
    ctx: &CliContext,
    user: i64,
    prompt: Option<&str>,
    dir: Option<&str>,
    session: Option<&str>,
    json: bool,
) -> Result<()> {
    let response = ctx
        .context
        .execute_contextual_query(user, prompt.unwrap_or(""), dir, session)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if response.is_error {
        eprintln!("Query failed: {}", response.content);
        if let Some(ref error_type) = response.error_type {
            eprintln!("({error_type})");
        }
        std::process::exit(1);
    }

    println!("{}", response.content);

    let mut footer = format!("[{} ms", response.duration_ms);
    if response.cost > 0.0 {
        footer.push_str(&format!(", ${:.4}", response.cost));
    }
    if let Some(ref session_id) = response.session_id {
        footer.push_str(&format!(", session {session_id}"));
    }
    footer.push(']');
    eprintln!("{footer}");
    Ok(())
}
