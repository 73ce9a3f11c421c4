//! In-memory stand-ins for every collaborator seam.

use async_trait::async_trait;
use connectors::sql::base::error::{ConnectorError, DbError};
use engine_core::{
    connectors::{
        provider::ConnectionProvider,
        sink::TargetSession,
        source::{RowSource, SourceConnection},
    },
    error::{ConsistencyError, LedgerError},
    state::{ConsistencyCheck, LedgerStore},
};
use model::{
    core::value::{FieldValue, Value},
    execution::mode::IntegrityMode,
    records::row::RowData,
};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
};

pub fn id_of(row: &RowData) -> i64 {
    match row.get_value("id") {
        Value::Int(id) => id,
        other => panic!("row without integer id: {other:?}"),
    }
}

/// Yields rows `id = 1..=n` with a text column, counting every poll.
pub struct FakeRowSource {
    entity: String,
    rows: u64,
    next: u64,
    fail_at: Option<u64>,
    poison_at: Option<u64>,
    malformed_at: Option<u64>,
    pulls: Arc<AtomicU64>,
}

impl FakeRowSource {
    pub fn new(entity: &str, rows: u64) -> Self {
        Self {
            entity: entity.to_string(),
            rows,
            next: 1,
            fail_at: None,
            poison_at: None,
            malformed_at: None,
            pulls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The `n`th poll returns a retrieval error.
    pub fn fail_at(mut self, n: u64) -> Self {
        self.fail_at = Some(n);
        self
    }

    /// Row `n` carries text the encoder must reject.
    pub fn poison_at(mut self, n: u64) -> Self {
        self.poison_at = Some(n);
        self
    }

    /// Row `n` carries bytes that are not valid UTF-8 in its text column.
    pub fn malformed_at(mut self, n: u64) -> Self {
        self.malformed_at = Some(n);
        self
    }

    pub fn pulls(&self) -> Arc<AtomicU64> {
        self.pulls.clone()
    }
}

#[async_trait]
impl RowSource for FakeRowSource {
    async fn next_row(&mut self) -> Option<Result<RowData, DbError>> {
        let pull = self.pulls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_at == Some(pull) {
            self.next = self.rows + 1;
            return Some(Err(DbError::Unknown("source connection reset".into())));
        }
        if self.next > self.rows {
            return None;
        }

        let id = self.next;
        self.next += 1;
        let name = if self.malformed_at == Some(id) {
            Value::MalformedText(vec![b'i', 0xff, b't'])
        } else if self.poison_at == Some(id) {
            Value::String(format!("item\0{id}"))
        } else {
            Value::String(format!("item-{id}"))
        };
        Some(Ok(RowData::new(
            &self.entity,
            vec![
                FieldValue::new("id", Value::Int(id as i64)),
                FieldValue::new("name", name),
            ],
        )))
    }
}

struct FakeSourceConnection {
    source: FakeRowSource,
    statements: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl SourceConnection for FakeSourceConnection {
    async fn open_cursor(
        self: Box<Self>,
        sql: String,
        _entity: String,
    ) -> Result<Box<dyn RowSource>, DbError> {
        self.statements.lock().unwrap().push(sql);
        Ok(Box::new(self.source))
    }
}

#[derive(Default)]
struct TargetState {
    committed: Vec<String>,
    mode: IntegrityMode,
    mode_switches: usize,
    copy_calls: u64,
    fail_copy_at: Option<u64>,
    fail_mode_read: bool,
    modes_during_copy: Vec<IntegrityMode>,
    batch_sizes: Vec<usize>,
    pulls_at_copy: Vec<u64>,
    observed_pulls: Option<Arc<AtomicU64>>,
}

/// A target table plus its session settings, shared by every session handed out.
#[derive(Clone, Default)]
pub struct FakeTarget {
    state: Arc<Mutex<TargetState>>,
}

impl FakeTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(self, mode: IntegrityMode) -> Self {
        self.state.lock().unwrap().mode = mode;
        self
    }

    /// The `n`th COPY channel is rejected and commits nothing.
    pub fn fail_copy_at(self, n: u64) -> Self {
        self.state.lock().unwrap().fail_copy_at = Some(n);
        self
    }

    pub fn fail_mode_read(self) -> Self {
        self.state.lock().unwrap().fail_mode_read = true;
        self
    }

    /// Records the source's poll count whenever a COPY channel opens.
    pub fn observe_pulls(self, pulls: Arc<AtomicU64>) -> Self {
        self.state.lock().unwrap().observed_pulls = Some(pulls);
        self
    }

    pub fn session(&self) -> FakeSession {
        FakeSession {
            state: self.state.clone(),
        }
    }

    pub fn committed(&self) -> Vec<String> {
        self.state.lock().unwrap().committed.clone()
    }

    pub fn mode(&self) -> IntegrityMode {
        self.state.lock().unwrap().mode
    }

    pub fn mode_switches(&self) -> usize {
        self.state.lock().unwrap().mode_switches
    }

    pub fn copy_calls(&self) -> u64 {
        self.state.lock().unwrap().copy_calls
    }

    pub fn modes_during_copy(&self) -> Vec<IntegrityMode> {
        self.state.lock().unwrap().modes_during_copy.clone()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.state.lock().unwrap().batch_sizes.clone()
    }

    pub fn pulls_at_copy(&self) -> Vec<u64> {
        self.state.lock().unwrap().pulls_at_copy.clone()
    }
}

pub struct FakeSession {
    state: Arc<Mutex<TargetState>>,
}

#[async_trait]
impl TargetSession for FakeSession {
    async fn integrity_mode(&mut self) -> Result<IntegrityMode, DbError> {
        let state = self.state.lock().unwrap();
        if state.fail_mode_read {
            return Err(DbError::Unknown("permission denied".into()));
        }
        Ok(state.mode)
    }

    async fn set_integrity_mode(&mut self, mode: IntegrityMode) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        state.mode = mode;
        state.mode_switches += 1;
        Ok(())
    }

    async fn copy_in(&mut self, _statement: &str, records: &[String]) -> Result<u64, DbError> {
        let mut state = self.state.lock().unwrap();
        state.copy_calls += 1;
        let mode = state.mode;
        state.modes_during_copy.push(mode);
        state.batch_sizes.push(records.len());
        if let Some(pulls) = state.observed_pulls.clone() {
            state.pulls_at_copy.push(pulls.load(Ordering::SeqCst));
        }

        if state.fail_copy_at == Some(state.copy_calls) {
            return Err(DbError::Unknown("COPY rejected by target".into()));
        }
        state.committed.extend(records.iter().cloned());
        Ok(records.len() as u64)
    }
}

/// Hands out one scripted source cursor and sessions on a shared fake target.
pub struct FakeProvider {
    source: Mutex<Option<FakeRowSource>>,
    target: FakeTarget,
    target_unavailable: bool,
    statements: Arc<Mutex<Vec<String>>>,
    sources_acquired: AtomicUsize,
    targets_acquired: AtomicUsize,
    released: AtomicUsize,
}

impl FakeProvider {
    pub fn new(source: FakeRowSource, target: FakeTarget) -> Self {
        Self {
            source: Mutex::new(Some(source)),
            target,
            target_unavailable: false,
            statements: Arc::new(Mutex::new(Vec::new())),
            sources_acquired: AtomicUsize::new(0),
            targets_acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        }
    }

    pub fn target_unavailable(mut self) -> Self {
        self.target_unavailable = true;
        self
    }

    pub fn sources_acquired(&self) -> usize {
        self.sources_acquired.load(Ordering::SeqCst)
    }

    pub fn targets_acquired(&self) -> usize {
        self.targets_acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConnectionProvider for FakeProvider {
    async fn acquire_source(&self) -> Result<Box<dyn SourceConnection>, ConnectorError> {
        self.sources_acquired.fetch_add(1, Ordering::SeqCst);
        let source = self
            .source
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| ConnectorError::Pool("source already used".into()))?;
        Ok(Box::new(FakeSourceConnection {
            source,
            statements: self.statements.clone(),
        }))
    }

    async fn acquire_target(&self) -> Result<Box<dyn TargetSession>, ConnectorError> {
        if self.target_unavailable {
            return Err(ConnectorError::Pool("pool timed out".into()));
        }
        self.targets_acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.target.session()))
    }

    async fn release_target(&self, session: Box<dyn TargetSession>) {
        self.released.fetch_add(1, Ordering::SeqCst);
        drop(session);
    }
}

/// Ledger entries keyed by chunk id, with a delete counter.
#[derive(Default)]
pub struct FakeLedger {
    entries: Mutex<HashMap<i64, String>>,
    deletes: AtomicUsize,
    failing: bool,
}

impl FakeLedger {
    pub fn with_entry(id: i64, table: &str) -> Self {
        let ledger = Self::default();
        ledger.entries.lock().unwrap().insert(id, table.to_string());
        ledger
    }

    pub fn failing_deletes(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn contains(&self, id: i64) -> bool {
        self.entries.lock().unwrap().contains_key(&id)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerStore for FakeLedger {
    async fn delete_entry(&self, chunk_id: i64) -> Result<(), LedgerError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(LedgerError::Database(DbError::Unknown(
                "ledger unreachable".into(),
            )));
        }
        self.entries.lock().unwrap().remove(&chunk_id);
        Ok(())
    }

    async fn entry_table(&self, chunk_id: i64) -> Result<Option<String>, LedgerError> {
        Ok(self.entries.lock().unwrap().get(&chunk_id).cloned())
    }
}

pub struct FakeCheck {
    applied: bool,
    failing: bool,
    calls: AtomicUsize,
}

impl FakeCheck {
    pub fn applied() -> Self {
        Self {
            applied: true,
            failing: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fresh() -> Self {
        Self {
            applied: false,
            ..Self::applied()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::fresh()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConsistencyCheck for FakeCheck {
    async fn was_chunk_applied(&self, _chunk_id: i64) -> Result<bool, ConsistencyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(ConsistencyError::Probe {
                table: "orders".into(),
                source: DbError::Unknown("probe timed out".into()),
            });
        }
        Ok(self.applied)
    }
}
