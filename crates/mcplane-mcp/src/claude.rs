//! Claude CLI integration.
//!
//! Translates contextual queries and registry operations into concrete
//! CLI invocations and parses their output. The CLI's text output is not
//! a stable contract; parsing here is best-effort and every caller-facing
//! surface degrades rather than guesses.

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::{Duration, timeout};

use mcplane_core::domain::{NewUsageRecord, ServerState};
use mcplane_core::ports::{
    CliOutput, CliRunner, CliRunnerError, ProbedServer, ServerStatusProbe, UsageRepository,
};
use mcplane_core::McpError;

/// Timeout for management operations against the CLI.
pub const MANAGEMENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default binary name of the external CLI.
pub const DEFAULT_BINARY: &str = "claude";

// ─────────────────────────────────────────────────────────────────────────────
// Subprocess runner
// ─────────────────────────────────────────────────────────────────────────────

/// Runs the external Claude CLI as a subprocess.
///
/// One primitive for every invocation: argument vector in, structured
/// completed-process result out, with a fixed environment and an enforced
/// timeout. The child is killed if the timeout fires.
pub struct ClaudeCli {
    binary: String,
    timeout: Duration,
}

impl ClaudeCli {
    /// Create a runner for the given binary name or path.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout: MANAGEMENT_TIMEOUT,
        }
    }

    /// Override the enforced timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClaudeCli {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY)
    }
}

#[async_trait]
impl CliRunner for ClaudeCli {
    async fn run(&self, args: &[String]) -> Result<CliOutput, CliRunnerError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .env("NO_COLOR", "1")
            .env("TERM", "dumb")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(binary = %self.binary, args = ?args, "Running external CLI");

        let child = cmd
            .spawn()
            .map_err(|e| CliRunnerError::Spawn(e.to_string()))?;

        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| CliRunnerError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| CliRunnerError::Io(e.to_string()))?;

        Ok(CliOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Parsed result of one query execution.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ClaudeResponse {
    /// Response text.
    pub content: String,
    /// Reported cost in USD (0 when the CLI did not report one).
    pub cost: f64,
    /// Wall-clock execution time in milliseconds.
    pub duration_ms: u64,
    /// Conversation correlation ID, when the CLI returned one.
    pub session_id: Option<String>,
    /// Whether the execution failed.
    pub is_error: bool,
    /// Failure classification when `is_error` is set.
    pub error_type: Option<String>,
}

/// Structured payload the CLI emits in its JSON output mode.
#[derive(Debug, Deserialize)]
struct JsonPayload {
    #[serde(default, alias = "content")]
    result: Option<String>,
    #[serde(default, alias = "total_cost_usd")]
    cost_usd: Option<f64>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    is_error: Option<bool>,
}

/// Parse a completed invocation into a response.
///
/// Tries the CLI's JSON payload first; plain text output falls back to
/// being the content verbatim. A non-zero exit code always wins over
/// whatever stdout claims.
fn parse_response(output: &CliOutput, duration_ms: u64) -> ClaudeResponse {
    if !output.success() {
        let detail = if output.stderr.trim().is_empty() {
            output.stdout.trim()
        } else {
            output.stderr.trim()
        };
        return ClaudeResponse {
            content: detail.to_string(),
            cost: 0.0,
            duration_ms,
            session_id: None,
            is_error: true,
            error_type: Some("cli_error".to_string()),
        };
    }

    let trimmed = output.stdout.trim();

    if let Ok(payload) = serde_json::from_str::<JsonPayload>(trimmed) {
        return ClaudeResponse {
            content: payload.result.unwrap_or_default(),
            cost: payload.cost_usd.unwrap_or(0.0),
            duration_ms,
            session_id: payload.session_id,
            is_error: payload.is_error.unwrap_or(false),
            error_type: None,
        };
    }

    ClaudeResponse {
        content: trimmed.to_string(),
        cost: 0.0,
        duration_ms,
        session_id: None,
        is_error: false,
        error_type: None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server list parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Classify one status glyph from `mcp list` output.
const fn glyph_state(c: char) -> Option<ServerState> {
    match c {
        '\u{2713}' => Some(ServerState::Active),   // ✓
        '\u{2717}' => Some(ServerState::Error),    // ✗
        '\u{25CB}' => Some(ServerState::Inactive), // ○
        _ => None,
    }
}

/// Parse the CLI's line-oriented `mcp list` output.
///
/// Lines with a status glyph start a new entry; the first token after the
/// glyph is the server name and the rest is detail text. Unrecognized
/// lines continue the previous entry's details, or are skipped when no
/// entry exists yet.
fn parse_server_list(stdout: &str) -> Vec<ProbedServer> {
    let mut servers: Vec<ProbedServer> = Vec::new();

    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let state = line.chars().next().and_then(glyph_state);

        if let Some(state) = state {
            let rest = line[line.chars().next().map_or(0, char::len_utf8)..].trim();
            let mut parts = rest.splitn(2, char::is_whitespace);
            let name = parts.next().unwrap_or_default().trim_end_matches(':');
            let details = parts.next().unwrap_or_default().trim();

            if name.is_empty() {
                continue;
            }

            servers.push(ProbedServer {
                name: name.to_string(),
                state,
                details: details.to_string(),
            });
        } else if let Some(last) = servers.last_mut() {
            if !last.details.is_empty() {
                last.details.push('\n');
            }
            last.details.push_str(line);
        }
        // No entry yet: skip the line.
    }

    servers
}

// ─────────────────────────────────────────────────────────────────────────────
// Integration
// ─────────────────────────────────────────────────────────────────────────────

/// High-level CLI integration: query execution and registry operations.
///
/// When a usage sink is attached, every query execution appends a usage
/// record; append failures are logged and swallowed so accounting never
/// blocks the primary operation.
pub struct ClaudeIntegration {
    runner: Arc<dyn CliRunner>,
    usage: Option<Arc<dyn UsageRepository>>,
}

impl ClaudeIntegration {
    /// Create an integration over the given runner.
    pub fn new(runner: Arc<dyn CliRunner>) -> Self {
        Self {
            runner,
            usage: None,
        }
    }

    /// Attach a usage sink for query accounting.
    #[must_use]
    pub fn with_usage_sink(mut self, usage: Arc<dyn UsageRepository>) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Execute a query in the context of an MCP server.
    ///
    /// Builds `[--session <id>] [--directory <dir>] (<prompt> |
    /// --continue)`, runs it, and parses the output. The server name is
    /// used for usage accounting; the CLI resolves registered servers
    /// itself.
    ///
    /// # Errors
    ///
    /// Returns `McpError::Command` when the subprocess itself fails
    /// (spawn failure or timeout). A CLI-reported error is returned as a
    /// response with `is_error` set, not as an `Err`.
    pub async fn run_command_with_mcp(
        &self,
        user_id: i64,
        prompt: &str,
        working_directory: Option<&str>,
        server_name: &str,
        session_id: Option<&str>,
    ) -> Result<ClaudeResponse, McpError> {
        let mut args: Vec<String> = Vec::new();

        if let Some(session) = session_id {
            args.push("--session".to_string());
            args.push(session.to_string());
        }
        if let Some(dir) = working_directory {
            if dir != "." {
                args.push("--directory".to_string());
                args.push(dir.to_string());
            }
        }
        if prompt.is_empty() {
            args.push("--continue".to_string());
        } else {
            args.push(prompt.to_string());
        }

        let started = std::time::Instant::now();
        let result = self.runner.run(&args).await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                self.log_usage(NewUsageRecord::failure(
                    user_id,
                    server_name,
                    prompt,
                    duration_ms,
                    e.to_string(),
                ))
                .await;
                return Err(McpError::Command(e.to_string()));
            }
        };

        let response = parse_response(&output, duration_ms);

        let mut record = if response.is_error {
            NewUsageRecord::failure(
                user_id,
                server_name,
                prompt,
                duration_ms,
                response.content.clone(),
            )
        } else {
            NewUsageRecord::success(user_id, server_name, prompt, duration_ms, response.cost)
        };
        if let Some(ref session) = response.session_id {
            record = record.with_session(session.clone());
        }
        self.log_usage(record).await;

        Ok(response)
    }

    /// Enumerate servers registered with the CLI.
    ///
    /// # Errors
    ///
    /// A non-zero exit is `Failed`, never an empty list: a broken CLI
    /// is indistinguishable from an empty registry otherwise, and
    /// callers would act on servers that may well be registered.
    pub async fn list_mcp_servers(
        &self,
        user_id: i64,
    ) -> Result<Vec<ProbedServer>, CliRunnerError> {
        let args = vec!["mcp".to_string(), "list".to_string()];
        let output = self.runner.run(&args).await?;

        if !output.success() {
            tracing::warn!(
                user_id,
                exit_code = ?output.exit_code,
                "CLI list command failed"
            );
            return Err(CliRunnerError::Failed {
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(parse_server_list(&output.stdout))
    }

    /// Register a server with the CLI.
    pub async fn add_mcp_server(
        &self,
        user_id: i64,
        name: &str,
        env: &[(String, String)],
        launch_argv: &[String],
    ) -> Result<bool, CliRunnerError> {
        let mut args = vec!["mcp".to_string(), "add".to_string(), name.to_string()];
        for (key, value) in env {
            args.push("--env".to_string());
            args.push(format!("{key}={value}"));
        }
        args.push("--".to_string());
        args.extend(launch_argv.iter().cloned());

        let output = self.runner.run(&args).await?;

        tracing::debug!(
            user_id,
            server_name = %name,
            success = output.success(),
            "CLI add command finished"
        );

        Ok(output.success())
    }

    /// Deregister a server from the CLI.
    pub async fn remove_mcp_server(
        &self,
        user_id: i64,
        name: &str,
    ) -> Result<bool, CliRunnerError> {
        let args = vec!["mcp".to_string(), "remove".to_string(), name.to_string()];
        let output = self.runner.run(&args).await?;

        tracing::debug!(
            user_id,
            server_name = %name,
            success = output.success(),
            "CLI remove command finished"
        );

        Ok(output.success())
    }

    /// Look up one server in the CLI's registry.
    ///
    /// Returns `None` when the CLI does not know the name.
    pub async fn check_mcp_server_status(
        &self,
        user_id: i64,
        server_name: &str,
    ) -> Result<Option<ProbedServer>, CliRunnerError> {
        let servers = self.list_mcp_servers(user_id).await?;
        Ok(servers.into_iter().find(|s| s.name == server_name))
    }

    async fn log_usage(&self, record: NewUsageRecord) {
        let Some(ref usage) = self.usage else {
            return;
        };

        if let Err(e) = usage.append(record).await {
            tracing::warn!(error = %e, "Failed to append usage record");
        }
    }
}

#[async_trait]
impl ServerStatusProbe for ClaudeIntegration {
    async fn list_servers(&self, user_id: i64) -> Result<Vec<ProbedServer>, CliRunnerError> {
        self.list_mcp_servers(user_id).await
    }

    async fn register(
        &self,
        user_id: i64,
        name: &str,
        env: &[(String, String)],
        launch_argv: &[String],
    ) -> Result<bool, CliRunnerError> {
        self.add_mcp_server(user_id, name, env, launch_argv).await
    }

    async fn deregister(&self, user_id: i64, name: &str) -> Result<bool, CliRunnerError> {
        self.remove_mcp_server(user_id, name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::ScriptedRunner;

    fn ok(stdout: &str) -> CliOutput {
        CliOutput {
            exit_code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    #[test]
    fn test_parse_json_response() {
        let output = ok(r#"{"result":"three files","total_cost_usd":0.0134,"session_id":"sess-9"}"#);
        let response = parse_response(&output, 420);

        assert_eq!(response.content, "three files");
        assert!((response.cost - 0.0134).abs() < 1e-9);
        assert_eq!(response.session_id.as_deref(), Some("sess-9"));
        assert!(!response.is_error);
        assert_eq!(response.duration_ms, 420);
    }

    #[test]
    fn test_parse_plain_text_response() {
        let response = parse_response(&ok("just some text"), 100);
        assert_eq!(response.content, "just some text");
        assert_eq!(response.cost, 0.0);
        assert!(response.session_id.is_none());
    }

    #[test]
    fn test_nonzero_exit_is_error() {
        let output = CliOutput {
            exit_code: Some(1),
            stdout: String::new(),
            stderr: "invalid api key".to_string(),
        };
        let response = parse_response(&output, 50);
        assert!(response.is_error);
        assert_eq!(response.content, "invalid api key");
        assert_eq!(response.error_type.as_deref(), Some("cli_error"));
    }

    #[test]
    fn test_parse_server_list_glyphs() {
        let stdout = "\
\u{2713} filesystem: npx -y @modelcontextprotocol/server-filesystem /home/u
\u{2717} github connection refused
\u{25CB} postgres
";
        let servers = parse_server_list(stdout);
        assert_eq!(servers.len(), 3);
        assert_eq!(servers[0].name, "filesystem");
        assert_eq!(servers[0].state, ServerState::Active);
        assert_eq!(servers[1].name, "github");
        assert_eq!(servers[1].state, ServerState::Error);
        assert_eq!(servers[1].details, "connection refused");
        assert_eq!(servers[2].name, "postgres");
        assert_eq!(servers[2].state, ServerState::Inactive);
    }

    #[test]
    fn test_continuation_lines_append_to_previous_entry() {
        let stdout = "\
\u{2717} github connection refused
  retried 3 times
  giving up
";
        let servers = parse_server_list(stdout);
        assert_eq!(servers.len(), 1);
        assert!(servers[0].details.contains("retried 3 times"));
        assert!(servers[0].details.contains("giving up"));
    }

    #[test]
    fn test_leading_noise_is_skipped() {
        let stdout = "Checking MCP servers...\n\u{2713} fs ready\n";
        let servers = parse_server_list(stdout);
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].name, "fs");
    }

    #[tokio::test]
    async fn test_query_builds_spec_argv() {
        let runner = Arc::new(ScriptedRunner::always(ok(r#"{"result":"hi","session_id":"s1"}"#)));
        let integration = ClaudeIntegration::new(runner.clone());

        let response = integration
            .run_command_with_mcp(7, "list files", Some("/work"), "fs", Some("s0"))
            .await
            .unwrap();

        assert_eq!(response.session_id.as_deref(), Some("s1"));

        let calls = runner.calls();
        assert_eq!(
            calls[0],
            vec!["--session", "s0", "--directory", "/work", "list files"]
        );
    }

    #[tokio::test]
    async fn test_empty_prompt_continues_conversation() {
        let runner = Arc::new(ScriptedRunner::always(ok("continued")));
        let integration = ClaudeIntegration::new(runner.clone());

        integration
            .run_command_with_mcp(7, "", None, "fs", None)
            .await
            .unwrap();

        assert_eq!(runner.calls()[0], vec!["--continue"]);
    }

    #[tokio::test]
    async fn test_default_directory_omits_flag() {
        let runner = Arc::new(ScriptedRunner::always(ok("done")));
        let integration = ClaudeIntegration::new(runner.clone());

        integration
            .run_command_with_mcp(7, "q", Some("."), "fs", None)
            .await
            .unwrap();

        assert_eq!(runner.calls()[0], vec!["q"]);
    }

    #[tokio::test]
    async fn test_add_server_argv_shape() {
        let runner = Arc::new(ScriptedRunner::always(ok("added")));
        let integration = ClaudeIntegration::new(runner.clone());

        let env = vec![("TOKEN".to_string(), "secret".to_string())];
        let argv = vec!["npx".to_string(), "-y".to_string(), "pkg".to_string()];
        let accepted = integration.add_mcp_server(7, "fs", &env, &argv).await.unwrap();

        assert!(accepted);
        assert_eq!(
            runner.calls()[0],
            vec!["mcp", "add", "fs", "--env", "TOKEN=secret", "--", "npx", "-y", "pkg"]
        );
    }

    #[tokio::test]
    async fn test_runner_failure_becomes_command_error() {
        let runner = Arc::new(ScriptedRunner::failing(CliRunnerError::Timeout(30)));
        let integration = ClaudeIntegration::new(runner);

        let result = integration
            .run_command_with_mcp(7, "q", None, "fs", None)
            .await;

        assert!(matches!(result, Err(McpError::Command(_))));
    }

    #[tokio::test]
    async fn test_failed_list_is_an_error_not_an_empty_registry() {
        let runner = Arc::new(ScriptedRunner::always(CliOutput {
            exit_code: Some(1),
            stdout: String::new(),
            stderr: "not logged in\n".to_string(),
        }));
        let integration = ClaudeIntegration::new(runner);

        let err = integration.list_mcp_servers(7).await.unwrap_err();
        assert!(matches!(
            err,
            CliRunnerError::Failed {
                exit_code: Some(1),
                ..
            }
        ));
        assert!(err.to_string().contains("not logged in"));
    }

    #[tokio::test]
    async fn test_check_status_not_found() {
        let runner = Arc::new(ScriptedRunner::always(ok("\u{2713} other ready\n")));
        let integration = ClaudeIntegration::new(runner);

        let found = integration.check_mcp_server_status(7, "fs").await.unwrap();
        assert!(found.is_none());
    }
}
