//! Command handlers.
//!
//! Thin adapters between parsed arguments and the mcp crate: each
//! handler resolves its inputs, calls one service operation, and prints
//! either a table or JSON.

pub mod context;
pub mod query;
pub mod reconcile;
pub mod server;
pub mod stats;
pub mod template;

use mcplane_core::ServerKind;

use crate::error::CliError;

/// Parse a template kind tag from the command line.
pub fn parse_kind(tag: &str) -> Result<ServerKind, CliError> {
    ServerKind::parse(&tag.to_lowercase()).ok_or_else(|| {
        let known: Vec<&str> = ServerKind::ALL.iter().map(|k| k.as_str()).collect();
        CliError::Arguments(format!(
            "Unknown template kind '{tag}' (expected one of: {})",
            known.join(", ")
        ))
    })
}

/// Parse repeated `KEY=VALUE` arguments into template inputs.
pub fn parse_inputs(
    pairs: &[String],
) -> Result<std::collections::HashMap<String, String>, CliError> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| {
                    CliError::Arguments(format!("Expected KEY=VALUE, got '{pair}'"))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_case_insensitive() {
        assert_eq!(parse_kind("GitHub").unwrap(), ServerKind::Github);
        assert!(parse_kind("redis").is_err());
    }

    #[test]
    fn test_parse_inputs() {
        let inputs =
            parse_inputs(&["path=/data".to_string(), "extra=a=b".to_string()]).unwrap();
        assert_eq!(inputs["path"], "/data");
        assert_eq!(inputs["extra"], "a=b");
        assert!(parse_inputs(&["no-equals".to_string()]).is_err());
    }
}
