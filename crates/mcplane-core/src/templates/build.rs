//! Deterministic config construction from validated wizard inputs.

use std::collections::HashMap;

use crate::domain::{NewServer, ServerKind};

/// Build the launch configuration for a kind from validated inputs.
///
/// Inputs are assumed validated; secrets go into env entries, everything
/// the user typed is preserved in the free-form config map.
pub(super) fn build(
    user_id: i64,
    name: String,
    kind: ServerKind,
    inputs: &HashMap<String, String>,
) -> NewServer {
    let mut server = match kind {
        ServerKind::Github => NewServer::new(
            user_id,
            name,
            kind,
            "npx",
            vec![
                "-y".to_string(),
                "@modelcontextprotocol/server-github".to_string(),
            ],
        )
        .with_env(
            "GITHUB_PERSONAL_ACCESS_TOKEN",
            inputs.get("token").cloned().unwrap_or_default(),
        ),

        ServerKind::Filesystem => NewServer::new(
            user_id,
            name,
            kind,
            "npx",
            vec![
                "-y".to_string(),
                "@modelcontextprotocol/server-filesystem".to_string(),
                inputs.get("path").cloned().unwrap_or_default(),
            ],
        ),

        ServerKind::Postgres => NewServer::new(
            user_id,
            name,
            kind,
            "npx",
            vec![
                "-y".to_string(),
                "@modelcontextprotocol/server-postgres".to_string(),
                inputs
                    .get("connection_string")
                    .cloned()
                    .unwrap_or_default(),
            ],
        ),

        ServerKind::Sqlite => NewServer::new(
            user_id,
            name,
            kind,
            "npx",
            vec![
                "-y".to_string(),
                "mcp-server-sqlite-npx".to_string(),
                inputs.get("path").cloned().unwrap_or_default(),
            ],
        ),

        ServerKind::Git => NewServer::new(
            user_id,
            name,
            kind,
            "npx",
            vec![
                "-y".to_string(),
                "@cyanheads/git-mcp-server".to_string(),
                "--repository".to_string(),
                inputs.get("repo_path").cloned().unwrap_or_default(),
            ],
        ),

        ServerKind::Playwright => {
            let mut args = vec!["-y".to_string(), "@playwright/mcp".to_string()];
            if let Some(browser) = inputs.get("browser") {
                if !browser.is_empty() {
                    args.push(format!("--browser={browser}"));
                }
            }
            NewServer::new(user_id, name, kind, "npx", args)
        }
    };

    // Preserve non-secret wizard inputs for later display/editing.
    // Secret values live only in env entries.
    let secret_keys: Vec<&str> = super::setup_steps(kind)
        .iter()
        .filter(|s| s.input == super::InputKind::Secret)
        .map(|s| s.key)
        .collect();
    for (key, value) in inputs {
        if !secret_keys.contains(&key.as_str()) {
            server.config.insert(key.clone(), value.clone());
        }
    }

    server
}
