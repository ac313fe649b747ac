//! Hand-rolled test doubles shared across this crate's unit tests.
//!
//! In-memory repositories back the same port traits the sqlite adapters
//! implement, so service tests run without a database. The scripted
//! runner and mock probe record their calls for assertion.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use mcplane_core::domain::{
    ActiveContext, NewServer, NewUsageRecord, ServerRecord, ServerUsage, UsageRecord, UsageStats,
};
use mcplane_core::ports::{
    CliOutput, CliRunner, CliRunnerError, ContextRepository, ProbedServer, RepositoryError,
    ServerRepository, ServerStatusProbe, UsageRepository,
};

fn clone_runner_error(e: &CliRunnerError) -> CliRunnerError {
    match e {
        CliRunnerError::Timeout(secs) => CliRunnerError::Timeout(*secs),
        CliRunnerError::Spawn(msg) => CliRunnerError::Spawn(msg.clone()),
        CliRunnerError::Io(msg) => CliRunnerError::Io(msg.clone()),
        CliRunnerError::Failed { exit_code, stderr } => CliRunnerError::Failed {
            exit_code: *exit_code,
            stderr: stderr.clone(),
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scripted CLI runner
// ─────────────────────────────────────────────────────────────────────────────

/// A `CliRunner` that returns a fixed result and records every argv.
pub struct ScriptedRunner {
    result: Result<CliOutput, CliRunnerError>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedRunner {
    pub fn always(output: CliOutput) -> Self {
        Self {
            result: Ok(output),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: CliRunnerError) -> Self {
        Self {
            result: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CliRunner for ScriptedRunner {
    async fn run(&self, args: &[String]) -> Result<CliOutput, CliRunnerError> {
        self.calls.lock().unwrap().push(args.to_vec());
        match &self.result {
            Ok(output) => Ok(output.clone()),
            Err(e) => Err(clone_runner_error(e)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mock status probe
// ─────────────────────────────────────────────────────────────────────────────

/// A `ServerStatusProbe` with scripted list output and call counters.
#[derive(Default)]
pub struct MockProbe {
    pub servers: Mutex<Vec<ProbedServer>>,
    pub list_calls: AtomicUsize,
    pub registered: Mutex<Vec<String>>,
    pub deregistered: Mutex<Vec<String>>,
    /// When set, every operation returns a runner error.
    pub fail: AtomicBool,
    /// When set, `register` returns `Ok(false)`.
    pub reject_register: AtomicBool,
}

impl MockProbe {
    pub fn with_servers(servers: Vec<ProbedServer>) -> Self {
        Self {
            servers: Mutex::new(servers),
            ..Self::default()
        }
    }

    fn check_fail(&self) -> Result<(), CliRunnerError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(CliRunnerError::Spawn("probe unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ServerStatusProbe for MockProbe {
    async fn list_servers(&self, _user_id: i64) -> Result<Vec<ProbedServer>, CliRunnerError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fail()?;
        Ok(self.servers.lock().unwrap().clone())
    }

    async fn register(
        &self,
        _user_id: i64,
        name: &str,
        _env: &[(String, String)],
        _launch_argv: &[String],
    ) -> Result<bool, CliRunnerError> {
        self.check_fail()?;
        if self.reject_register.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.registered.lock().unwrap().push(name.to_string());
        Ok(true)
    }

    async fn deregister(&self, _user_id: i64, name: &str) -> Result<bool, CliRunnerError> {
        self.check_fail()?;
        self.deregistered.lock().unwrap().push(name.to_string());
        Ok(true)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory repositories
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryServerRepository {
    records: Mutex<Vec<ServerRecord>>,
    next_id: AtomicUsize,
    /// When set, every operation returns a storage error.
    pub fail: AtomicBool,
}

impl MemoryServerRepository {
    fn check_fail(&self) -> Result<(), RepositoryError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(RepositoryError::Internal("storage offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ServerRepository for MemoryServerRepository {
    async fn insert(&self, server: NewServer) -> Result<ServerRecord, RepositoryError> {
        self.check_fail()?;
        let mut records = self.records.lock().unwrap();
        if records
            .iter()
            .any(|r| r.user_id == server.user_id && r.name == server.name)
        {
            return Err(RepositoryError::Conflict(server.name));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        let record = ServerRecord {
            id,
            user_id: server.user_id,
            name: server.name,
            kind: server.kind,
            command: server.command,
            args: server.args,
            env: server.env,
            config: server.config,
            enabled: server.enabled,
            created_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn get(&self, user_id: i64, name: &str) -> Result<ServerRecord, RepositoryError> {
        self.check_fail()?;
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.user_id == user_id && r.name == name)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(name.to_string()))
    }

    async fn list(&self, user_id: i64) -> Result<Vec<ServerRecord>, RepositoryError> {
        self.check_fail()?;
        let mut servers: Vec<ServerRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        servers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(servers)
    }

    async fn set_enabled(
        &self,
        user_id: i64,
        name: &str,
        enabled: bool,
    ) -> Result<(), RepositoryError> {
        self.check_fail()?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.user_id == user_id && r.name == name)
            .ok_or_else(|| RepositoryError::NotFound(name.to_string()))?;
        record.enabled = enabled;
        Ok(())
    }

    async fn delete(&self, user_id: i64, name: &str) -> Result<(), RepositoryError> {
        self.check_fail()?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| !(r.user_id == user_id && r.name == name));
        if records.len() == before {
            return Err(RepositoryError::NotFound(name.to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryContextRepository {
    contexts: Mutex<HashMap<i64, ActiveContext>>,
}

#[async_trait]
impl ContextRepository for MemoryContextRepository {
    async fn set(&self, context: &ActiveContext) -> Result<(), RepositoryError> {
        self.contexts
            .lock()
            .unwrap()
            .insert(context.user_id, context.clone());
        Ok(())
    }

    async fn get(&self, user_id: i64) -> Result<Option<ActiveContext>, RepositoryError> {
        Ok(self.contexts.lock().unwrap().get(&user_id).cloned())
    }

    async fn clear(&self, user_id: i64) -> Result<(), RepositoryError> {
        self.contexts.lock().unwrap().remove(&user_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUsageRepository {
    records: Mutex<Vec<UsageRecord>>,
    next_id: AtomicUsize,
    /// When set, `append` returns a storage error.
    pub fail_append: AtomicBool,
}

impl MemoryUsageRepository {
    pub fn records(&self) -> Vec<UsageRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl UsageRepository for MemoryUsageRepository {
    async fn append(&self, record: NewUsageRecord) -> Result<(), RepositoryError> {
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(RepositoryError::Internal("usage log offline".to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        self.records.lock().unwrap().push(UsageRecord {
            id,
            user_id: record.user_id,
            server_name: record.server_name,
            query: record.query,
            response_time_ms: record.response_time_ms,
            success: record.success,
            error_message: record.error_message,
            cost: record.cost,
            session_id: record.session_id,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn recent(&self, user_id: i64, limit: u32) -> Result<Vec<UsageRecord>, RepositoryError> {
        let mut records: Vec<UsageRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.id.cmp(&a.id));
        records.truncate(limit as usize);
        Ok(records)
    }

    async fn stats(&self, user_id: i64, days: u32) -> Result<UsageStats, RepositoryError> {
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
        let records: Vec<UsageRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id && r.created_at >= cutoff)
            .cloned()
            .collect();

        if records.is_empty() {
            return Ok(UsageStats::empty(days));
        }

        let mut by_server: HashMap<String, ServerUsage> = HashMap::new();
        for record in &records {
            let entry = by_server
                .entry(record.server_name.clone())
                .or_insert_with(|| ServerUsage {
                    server_name: record.server_name.clone(),
                    query_count: 0,
                    success_count: 0,
                    avg_response_time_ms: 0.0,
                    total_cost: 0.0,
                });
            entry.avg_response_time_ms = (entry.avg_response_time_ms
                * entry.query_count as f64
                + record.response_time_ms as f64)
                / (entry.query_count + 1) as f64;
            entry.query_count += 1;
            entry.success_count += u64::from(record.success);
            entry.total_cost += record.cost;
        }
        let mut by_server: Vec<ServerUsage> = by_server.into_values().collect();
        by_server.sort_by(|a, b| b.query_count.cmp(&a.query_count));

        let total = records.len() as u64;
        Ok(UsageStats {
            days,
            total_queries: total,
            servers_used: by_server.len() as u64,
            success_count: records.iter().filter(|r| r.success).count() as u64,
            avg_response_time_ms: records
                .iter()
                .map(|r| r.response_time_ms as f64)
                .sum::<f64>()
                / total as f64,
            total_cost: records.iter().map(|r| r.cost).sum(),
            by_server,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wiring helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Bundle of in-memory adapters with handles kept for assertions.
pub struct Fixture {
    pub servers: std::sync::Arc<MemoryServerRepository>,
    pub contexts: std::sync::Arc<MemoryContextRepository>,
    pub usage: std::sync::Arc<MemoryUsageRepository>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            servers: std::sync::Arc::new(MemoryServerRepository::default()),
            contexts: std::sync::Arc::new(MemoryContextRepository::default()),
            usage: std::sync::Arc::new(MemoryUsageRepository::default()),
        }
    }

    pub fn repos(&self) -> mcplane_core::ports::Repos {
        mcplane_core::ports::Repos::new(
            self.servers.clone(),
            self.contexts.clone(),
            self.usage.clone(),
        )
    }
}
