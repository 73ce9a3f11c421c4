use crate::{consumer::integrity::SuspendedIntegrity, error::LoaderError};
use engine_core::{
    connectors::{provider::ConnectionProvider, sink::TargetSession},
    log::MigrationLog,
    state::LedgerStore,
};
use model::execution::chunk::{Chunk, TransferOutcome};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// A checked-out target session plus the integrity obligation tied to it.
pub struct TargetLease {
    session: Box<dyn TargetSession>,
    integrity: Option<SuspendedIntegrity>,
}

impl TargetLease {
    pub fn new(session: Box<dyn TargetSession>) -> Self {
        Self {
            session,
            integrity: None,
        }
    }

    pub fn session(&mut self) -> &mut dyn TargetSession {
        self.session.as_mut()
    }

    pub fn hold_integrity(&mut self, token: Option<SuspendedIntegrity>) {
        self.integrity = token;
    }
}

/// How a chunk attempt ended, as far as cleanup is concerned.
pub enum Finish<'a> {
    Recovered,
    Loaded {
        rows: u64,
    },
    Failed {
        error: &'a LoaderError,
        /// The SELECT the chunk was read with.
        select: &'a str,
        /// The COPY the batches were written with.
        copy: &'a str,
    },
}

impl Finish<'_> {
    /// The statement a failure is blamed on: the COPY for a rejected batch,
    /// the SELECT for everything else.
    fn offending_statement(&self) -> Option<&str> {
        match self {
            Finish::Failed {
                error: LoaderError::Load { .. },
                copy,
                ..
            } => Some(*copy),
            Finish::Failed { select, .. } => Some(*select),
            Finish::Recovered | Finish::Loaded { .. } => None,
        }
    }
}

/// Terminal step of every chunk attempt.
///
/// Deletes the ledger entry, restores integrity as the last action on the
/// target session, releases the session exactly once and sends one outcome.
pub struct LedgerReporter {
    ledger: Arc<dyn LedgerStore>,
    provider: Arc<dyn ConnectionProvider>,
    log: MigrationLog,
    outcomes: mpsc::Sender<TransferOutcome>,
}

impl LedgerReporter {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        provider: Arc<dyn ConnectionProvider>,
        log: MigrationLog,
        outcomes: mpsc::Sender<TransferOutcome>,
    ) -> Self {
        Self {
            ledger,
            provider,
            log,
            outcomes,
        }
    }

    pub async fn finalize(
        &self,
        chunk: &Chunk,
        finish: Finish<'_>,
        lease: Option<TargetLease>,
    ) -> TransferOutcome {
        if let Finish::Failed { error, select, .. } = &finish {
            self.log
                .record_error(
                    &format!("Chunk {} of '{}' failed: {error}", chunk.id, chunk.table),
                    finish.offending_statement(),
                )
                .await;
            // The rejected-data record always names the rows, i.e. the SELECT.
            let table_log = self.log.table_log_path(&chunk.table);
            self.log.log(select, Some(&table_log)).await;
        }

        if let Err(err) = self.ledger.delete_entry(chunk.id).await {
            error!(chunk_id = chunk.id, error = %err, "Failed to delete ledger entry");
            self.log
                .record_error(
                    &format!("Failed to delete ledger entry {}: {err}", chunk.id),
                    None,
                )
                .await;
        }

        if let Some(lease) = lease {
            self.release(lease).await;
        }

        let outcome = match finish {
            Finish::Loaded { rows } => TransferOutcome::new(&chunk.table, rows),
            Finish::Recovered | Finish::Failed { .. } => TransferOutcome::empty(&chunk.table),
        };

        if self.outcomes.send(outcome.clone()).await.is_err() {
            warn!(chunk_id = chunk.id, "Outcome receiver is gone");
        }
        info!(
            chunk_id = chunk.id,
            table = %outcome.table,
            rows = outcome.rows_loaded,
            "Chunk finalized"
        );
        outcome
    }

    async fn release(&self, lease: TargetLease) {
        let TargetLease {
            mut session,
            integrity,
        } = lease;

        if let Some(token) = integrity {
            if let Err(err) = token.restore(session.as_mut()).await {
                error!(error = %err, "Integrity restore failed");
                self.log.record_error(&err.to_string(), None).await;
            }
        }

        self.provider.release_target(session).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        consumer::integrity::IntegrityController,
        fakes::{FakeLedger, FakeProvider, FakeRowSource, FakeTarget},
    };
    use connectors::sql::base::error::DbError;
    use model::execution::mode::{IntegrityMode, MigrationMode};
    use tempfile::tempdir;

    fn reporter(
        ledger: Arc<FakeLedger>,
        provider: Arc<FakeProvider>,
        logs: &std::path::Path,
    ) -> (LedgerReporter, mpsc::Receiver<TransferOutcome>) {
        let (tx, rx) = mpsc::channel(4);
        (
            LedgerReporter::new(ledger, provider, MigrationLog::new(logs), tx),
            rx,
        )
    }

    #[tokio::test]
    async fn ledger_failure_does_not_block_release() {
        let dir = tempdir().unwrap();
        let target = FakeTarget::new();
        let provider = Arc::new(FakeProvider::new(FakeRowSource::new("t", 0), target.clone()));
        let ledger = Arc::new(FakeLedger::with_entry(5, "t").failing_deletes());
        let (reporter, mut rx) = reporter(ledger.clone(), provider.clone(), dir.path());

        let session = provider.acquire_target().await.unwrap();
        let mut lease = TargetLease::new(session);
        let token = IntegrityController::new(MigrationMode::DataOnly)
            .suspend(lease.session())
            .await;
        lease.hold_integrity(token);

        let chunk = Chunk::new(5, "t", "`id`", 1);
        let outcome = reporter
            .finalize(&chunk, Finish::Loaded { rows: 1 }, Some(lease))
            .await;

        assert_eq!(outcome, TransferOutcome::new("t", 1));
        assert_eq!(rx.recv().await, Some(outcome));
        assert_eq!(provider.released(), 1);
        assert_eq!(target.mode(), IntegrityMode::Origin);
        let errors = std::fs::read_to_string(dir.path().join("errors-only.log")).unwrap();
        assert!(errors.contains("Failed to delete ledger entry 5"));
    }

    #[tokio::test]
    async fn failure_writes_statement_and_rejected_data_record() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(FakeProvider::new(FakeRowSource::new("orders", 0), FakeTarget::new()));
        let ledger = Arc::new(FakeLedger::with_entry(7, "orders"));
        let (reporter, _rx) = reporter(ledger.clone(), provider.clone(), dir.path());

        let error = LoaderError::Retrieval {
            table: "orders".into(),
            source: DbError::Unknown("cursor reset".into()),
        };
        let chunk = Chunk::new(7, "orders", "`id`", 3);
        let outcome = reporter
            .finalize(
                &chunk,
                Finish::Failed {
                    error: &error,
                    select: "SELECT `id` FROM `orders`;",
                    copy: "COPY \"public\".\"orders\" FROM STDIN;",
                },
                None,
            )
            .await;

        assert_eq!(outcome, TransferOutcome::empty("orders"));
        assert!(!ledger.contains(7));
        assert_eq!(provider.released(), 0);
        let rejected = std::fs::read_to_string(dir.path().join("orders.log")).unwrap();
        assert!(rejected.contains("SELECT `id` FROM `orders`;"));
        let errors = std::fs::read_to_string(dir.path().join("errors-only.log")).unwrap();
        assert!(errors.contains("cursor reset"));
        assert!(errors.contains("SQL: SELECT `id` FROM `orders`;"));
        assert!(!errors.contains("COPY"));
    }

    #[tokio::test]
    async fn rejected_batch_blames_the_copy_statement() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(FakeProvider::new(FakeRowSource::new("orders", 0), FakeTarget::new()));
        let ledger = Arc::new(FakeLedger::with_entry(8, "orders"));
        let (reporter, _rx) = reporter(ledger, provider, dir.path());

        let error = LoaderError::Load {
            table: "orders".into(),
            batch: 2,
            source: DbError::Unknown("check constraint violated".into()),
        };
        let chunk = Chunk::new(8, "orders", "`id`", 3);
        reporter
            .finalize(
                &chunk,
                Finish::Failed {
                    error: &error,
                    select: "SELECT `id` FROM `orders`;",
                    copy: "COPY \"public\".\"orders\" FROM STDIN;",
                },
                None,
            )
            .await;

        let errors = std::fs::read_to_string(dir.path().join("errors-only.log")).unwrap();
        assert!(errors.contains("SQL: COPY \"public\".\"orders\" FROM STDIN;"));
        let rejected = std::fs::read_to_string(dir.path().join("orders.log")).unwrap();
        assert!(rejected.contains("SELECT `id` FROM `orders`;"));
    }
}
