//! Pure validation rules per server kind.

use std::collections::HashMap;
use std::path::Path;

use crate::domain::ServerKind;

/// Known GitHub token prefixes.
const GITHUB_TOKEN_PREFIXES: [&str; 5] = ["ghp_", "gho_", "ghu_", "ghs_", "github_pat_"];

/// Minimum accepted GitHub token length.
const GITHUB_TOKEN_MIN_LEN: usize = 20;

/// Accepted SQLite file extensions.
const SQLITE_EXTENSIONS: [&str; 3] = ["db", "sqlite", "sqlite3"];

pub(super) fn validate(
    kind: ServerKind,
    inputs: &HashMap<String, String>,
) -> Result<(), String> {
    match kind {
        ServerKind::Github => validate_github(inputs),
        ServerKind::Filesystem => validate_absolute_path(inputs, "path"),
        ServerKind::Postgres => validate_postgres(inputs),
        ServerKind::Sqlite => validate_sqlite(inputs),
        ServerKind::Git => validate_absolute_path(inputs, "repo_path"),
        ServerKind::Playwright => Ok(()),
    }
}

fn required<'a>(
    inputs: &'a HashMap<String, String>,
    key: &str,
) -> Result<&'a str, String> {
    match inputs.get(key).map(String::as_str) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("Missing required field: {key}")),
    }
}

fn validate_github(inputs: &HashMap<String, String>) -> Result<(), String> {
    let token = required(inputs, "token")?;

    if !GITHUB_TOKEN_PREFIXES.iter().any(|p| token.starts_with(p)) {
        return Err("Token does not look like a GitHub token (unknown prefix)".to_string());
    }
    if token.len() < GITHUB_TOKEN_MIN_LEN {
        return Err(format!(
            "Token too short (minimum {GITHUB_TOKEN_MIN_LEN} characters)"
        ));
    }

    Ok(())
}

fn validate_absolute_path(
    inputs: &HashMap<String, String>,
    key: &str,
) -> Result<(), String> {
    let path = required(inputs, key)?;

    if !Path::new(path).is_absolute() {
        return Err(format!("Path must be absolute: {path}"));
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err(format!("Path must not contain parent traversal: {path}"));
    }

    Ok(())
}

fn validate_postgres(inputs: &HashMap<String, String>) -> Result<(), String> {
    let conn = required(inputs, "connection_string")?;

    let Some(rest) = conn.strip_prefix("postgresql://") else {
        return Err("Connection string must start with postgresql://".to_string());
    };
    if !rest.contains('@') || !rest.contains('/') {
        return Err(
            "Connection string must include credentials (@) and a database (/)".to_string(),
        );
    }

    Ok(())
}

fn validate_sqlite(inputs: &HashMap<String, String>) -> Result<(), String> {
    validate_absolute_path(inputs, "path")?;

    let path = required(inputs, "path")?;
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    if !SQLITE_EXTENSIONS.contains(&extension) {
        return Err(format!(
            "Unsupported database extension '.{extension}' (accepted: .db, .sqlite, .sqlite3)"
        ));
    }

    Ok(())
}
