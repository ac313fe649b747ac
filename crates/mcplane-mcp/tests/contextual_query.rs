//! End-to-end flow over a real SQLite database: add a server from a
//! template, inspect it, select it as the active context, and run a
//! query through it with a scripted CLI.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use mcplane_core::domain::ServerState;
use mcplane_core::ports::{
    CliOutput, CliRunner, CliRunnerError, ProbedServer, Repos, ServerStatusProbe,
};
use mcplane_core::ServerKind;
use mcplane_db::build_repos;
use mcplane_mcp::{ClaudeIntegration, ContextHandler, McpManager};

const USER: i64 = 42;

/// Probe whose list output mirrors its register/deregister calls.
#[derive(Default)]
struct RecordingProbe {
    registered: Mutex<Vec<String>>,
    list_calls: AtomicUsize,
}

#[async_trait]
impl ServerStatusProbe for RecordingProbe {
    async fn list_servers(&self, _user_id: i64) -> Result<Vec<ProbedServer>, CliRunnerError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .registered
            .lock()
            .unwrap()
            .iter()
            .map(|name| ProbedServer {
                name: name.clone(),
                state: ServerState::Active,
                details: String::new(),
            })
            .collect())
    }

    async fn register(
        &self,
        _user_id: i64,
        name: &str,
        _env: &[(String, String)],
        _launch_argv: &[String],
    ) -> Result<bool, CliRunnerError> {
        self.registered.lock().unwrap().push(name.to_string());
        Ok(true)
    }

    async fn deregister(&self, _user_id: i64, name: &str) -> Result<bool, CliRunnerError> {
        self.registered.lock().unwrap().retain(|n| n != name);
        Ok(true)
    }
}

/// Runner that answers every invocation with a fixed JSON payload.
struct FixedRunner(String);

#[async_trait]
impl CliRunner for FixedRunner {
    async fn run(&self, _args: &[String]) -> Result<CliOutput, CliRunnerError> {
        Ok(CliOutput {
            exit_code: Some(0),
            stdout: self.0.clone(),
            stderr: String::new(),
        })
    }
}

async fn test_repos() -> Repos {
    let pool = mcplane_db::setup_test_database().await.unwrap();
    build_repos(&pool)
}

fn fs_inputs(path: &str) -> HashMap<String, String> {
    let mut inputs = HashMap::new();
    inputs.insert("path".to_string(), path.to_string());
    inputs
}

#[tokio::test]
async fn test_full_contextual_query_flow() {
    let repos = test_repos().await;
    let probe = Arc::new(RecordingProbe::default());
    let manager = McpManager::new(repos.clone(), probe.clone());

    let runner = Arc::new(FixedRunner(
        r#"{"result":"You have 3 files","total_cost_usd":0.0134,"session_id":"sess-9"}"#
            .to_string(),
    ));
    let integration =
        Arc::new(ClaudeIntegration::new(runner).with_usage_sink(repos.usage.clone()));
    let handler = ContextHandler::new(repos.clone(), integration);

    // Add a filesystem server from its template.
    let record = manager
        .add_server(USER, "docs", ServerKind::Filesystem, &fs_inputs("/home/u/docs"))
        .await
        .unwrap();
    assert_eq!(record.command, "npx");
    assert!(record.enabled);

    // It shows up in the listing with template metadata.
    let servers = manager.user_servers(USER).await.unwrap();
    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0].template.display_name, "Filesystem");

    // The probe saw the registration and reports it active.
    let status = manager.server_status(USER, "docs").await.unwrap();
    assert_eq!(status.state, ServerState::Active);

    // Select it and run a query through it.
    handler.set_active_context(USER, "docs").await.unwrap();
    let response = handler
        .execute_contextual_query(USER, "how many files do I have?", None, None)
        .await
        .unwrap();

    assert_eq!(response.content, "You have 3 files");
    assert_eq!(response.session_id.as_deref(), Some("sess-9"));
    assert!(!response.is_error);

    // Usage landed in the database.
    let stats = repos.usage.stats(USER, 7).await.unwrap();
    assert_eq!(stats.total_queries, 1);
    assert_eq!(stats.success_count, 1);
    assert_eq!(stats.by_server[0].server_name, "docs");
    assert!((stats.total_cost - 0.0134).abs() < 1e-9);
}

#[tokio::test]
async fn test_status_is_cached_between_reads() {
    let repos = test_repos().await;
    let probe = Arc::new(RecordingProbe::default());
    let manager = McpManager::new(repos, probe.clone());

    manager
        .add_server(USER, "docs", ServerKind::Filesystem, &fs_inputs("/home/u/docs"))
        .await
        .unwrap();

    manager.server_status(USER, "docs").await.unwrap();
    let after_first = probe.list_calls.load(Ordering::SeqCst);
    manager.server_status(USER, "docs").await.unwrap();
    assert_eq!(probe.list_calls.load(Ordering::SeqCst), after_first);
}

#[tokio::test]
async fn test_remove_cleans_up_registry_and_context() {
    let repos = test_repos().await;
    let probe = Arc::new(RecordingProbe::default());
    let manager = McpManager::new(repos.clone(), probe.clone());

    let runner = Arc::new(FixedRunner("{}".to_string()));
    let handler = ContextHandler::new(repos.clone(), Arc::new(ClaudeIntegration::new(runner)));

    manager
        .add_server(USER, "docs", ServerKind::Filesystem, &fs_inputs("/home/u/docs"))
        .await
        .unwrap();
    handler.set_active_context(USER, "docs").await.unwrap();

    manager.remove_server(USER, "docs").await.unwrap();

    assert!(probe.registered.lock().unwrap().is_empty());
    assert!(handler.active_context(USER).await.unwrap().is_none());
    assert!(manager.user_servers(USER).await.unwrap().is_empty());
}
