use crate::{
    chunk::state::{Exit, ExitPath, LoadState, Settled},
    consumer::{integrity::IntegrityController, loader::BulkLoader},
    error::LoaderError,
    producer::{
        encoder::RowEncoder,
        extractor::{Delivery, SourceExtractor},
    },
    recovery::RecoveryGate,
    reporter::{Finish, LedgerReporter, TargetLease},
};
use engine_core::{
    connectors::{provider::ConnectionProvider, sink::TargetSession},
    context::global::MigrationSettings,
    error::SettingsError,
    log::MigrationLog,
    metrics::{Metrics, MetricsSnapshot},
    resolver::TableNameResolver,
    state::{ConsistencyCheck, LedgerStore},
};
use model::{
    core::utils::quote_mysql_ident,
    execution::chunk::{Chunk, TransferOutcome},
    records::batch::{Batch, BatchSignal},
};
use serde::Serialize;
use std::{num::NonZeroUsize, sync::Arc};
use tokio::sync::mpsc;
use tracing::{error, info, trace};

pub mod state;

/// The external collaborators a chunk attempt runs against.
pub struct Collaborators {
    pub provider: Arc<dyn ConnectionProvider>,
    pub check: Arc<dyn ConsistencyCheck>,
    pub ledger: Arc<dyn LedgerStore>,
    pub resolver: Arc<dyn TableNameResolver>,
    pub log: MigrationLog,
    pub outcomes: mpsc::Sender<TransferOutcome>,
}

/// What one chunk attempt did.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkReport {
    pub chunk_id: i64,
    pub exit: ExitPath,
    pub settled: Settled,
    /// The notification sent to the orchestrator.
    pub outcome: TransferOutcome,
    /// Rows durably in the target, including batches committed before a failure.
    pub committed_rows: u64,
    pub batches: u64,
    pub metrics: MetricsSnapshot,
    pub error: Option<String>,
}

/// Runs chunks through recovery, extraction, encoding and bulk loading.
pub struct ChunkProcessor {
    settings: MigrationSettings,
    watermark: NonZeroUsize,
    encoder: RowEncoder,
    provider: Arc<dyn ConnectionProvider>,
    resolver: Arc<dyn TableNameResolver>,
    gate: RecoveryGate,
    integrity: IntegrityController,
    reporter: LedgerReporter,
}

impl ChunkProcessor {
    pub fn new(
        settings: MigrationSettings,
        collaborators: Collaborators,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let watermark = settings.watermark()?;
        let encoder = RowEncoder::new(settings.delimiter)?;

        let Collaborators {
            provider,
            check,
            ledger,
            resolver,
            log,
            outcomes,
        } = collaborators;

        Ok(Self {
            watermark,
            encoder,
            integrity: IntegrityController::new(settings.mode),
            gate: RecoveryGate::new(check),
            reporter: LedgerReporter::new(ledger, provider.clone(), log, outcomes),
            provider,
            resolver,
            settings,
        })
    }

    /// The SELECT the chunk's rows are streamed from.
    pub fn source_statement(&self, chunk: &Chunk) -> String {
        let original = self.resolver.source_table(&chunk.table);
        format!(
            "SELECT {} FROM {};",
            chunk.select_list,
            quote_mysql_ident(&original)
        )
    }

    /// Runs one attempt to completion.
    ///
    /// Exactly one of recovery cleanup, load cleanup or failure cleanup runs
    /// before this returns, and exactly one outcome is sent.
    pub async fn process(&self, chunk: Chunk) -> ChunkReport {
        info!(
            chunk_id = chunk.id,
            table = %chunk.table,
            expected_rows = chunk.expected_rows,
            "Processing chunk"
        );

        let metrics = Metrics::new();
        let statement = self.source_statement(&chunk);
        let mut loader = BulkLoader::new(
            &self.settings.schema,
            &chunk.table,
            self.encoder.delimiter(),
        );

        let session = match self.provider.acquire_target().await {
            Ok(session) => session,
            Err(err) => {
                let exit = Exit::Failed(LoaderError::Connection(err));
                return self
                    .restore(&chunk, exit, None, &loader, &statement, &metrics)
                    .await;
            }
        };
        let mut lease = TargetLease::new(session);

        let exit = match self.gate.is_recovery(chunk.id).await {
            Ok(true) => Exit::Recovered,
            Ok(false) => {
                let token = self.integrity.suspend(lease.session()).await;
                lease.hold_integrity(token);

                match self.open_extractor(&chunk, &statement).await {
                    Ok(extractor) => {
                        self.run(&chunk, extractor, &mut loader, lease.session(), &metrics)
                            .await
                    }
                    Err(err) => Exit::Failed(err),
                }
            }
            Err(err) => Exit::Failed(err),
        };

        self.restore(&chunk, exit, Some(lease), &loader, &statement, &metrics)
            .await
    }

    async fn open_extractor(
        &self,
        chunk: &Chunk,
        statement: &str,
    ) -> Result<SourceExtractor, LoaderError> {
        let conn = self.provider.acquire_source().await?;
        SourceExtractor::open(conn, statement.to_string(), chunk.table.clone())
            .await
            .map_err(|source| LoaderError::Retrieval {
                table: chunk.table.clone(),
                source,
            })
    }

    /// Drives the load cycle until it reaches `Restoring`.
    async fn run(
        &self,
        chunk: &Chunk,
        mut extractor: SourceExtractor,
        loader: &mut BulkLoader,
        session: &mut dyn TargetSession,
        metrics: &Metrics,
    ) -> Exit {
        let mut batch = Batch::new(self.watermark);
        let mut state = LoadState::Extracting;

        loop {
            trace!(state = state.name(), "Chunk state");
            state = match state {
                LoadState::Extracting => match extractor.next().await {
                    Delivery::Row(row) => LoadState::Buffering(row),
                    // Paused only ever follows a full batch.
                    Delivery::Paused => LoadState::Draining,
                    Delivery::Exhausted if batch.is_empty() => LoadState::Restoring(Exit::Loaded),
                    Delivery::Exhausted => LoadState::Draining,
                    Delivery::Failed(source) => {
                        LoadState::Restoring(Exit::Failed(LoaderError::Retrieval {
                            table: chunk.table.clone(),
                            source,
                        }))
                    }
                },

                LoadState::Buffering(row) => match self.encoder.encode(&row) {
                    Ok(record) => {
                        metrics.increment_encoded(1);
                        match batch.push(record) {
                            BatchSignal::Ready => {
                                extractor.pause();
                                LoadState::Draining
                            }
                            BatchSignal::Accepting => LoadState::Extracting,
                        }
                    }
                    Err(source) => LoadState::Restoring(Exit::Failed(LoaderError::Encoding {
                        table: chunk.table.clone(),
                        row: extractor.delivered(),
                        source,
                    })),
                },

                LoadState::Draining => {
                    let sequence = batch.sequence();
                    let bytes = batch.size_bytes() as u64;
                    let result = loader.load(session, &batch).await;
                    batch.clear();

                    match result {
                        Ok(rows) => {
                            metrics.record_batch(rows, bytes);
                            if extractor.is_exhausted() {
                                LoadState::Restoring(Exit::Loaded)
                            } else {
                                extractor.resume();
                                LoadState::Extracting
                            }
                        }
                        Err(source) => LoadState::Restoring(Exit::Failed(LoaderError::Load {
                            table: chunk.table.clone(),
                            batch: sequence,
                            source,
                        })),
                    }
                }

                LoadState::Restoring(exit) => return exit,
            };
        }
    }

    /// Hands the attempt to the reporter and settles the state machine.
    async fn restore(
        &self,
        chunk: &Chunk,
        exit: Exit,
        lease: Option<TargetLease>,
        loader: &BulkLoader,
        statement: &str,
        metrics: &Metrics,
    ) -> ChunkReport {
        let committed_rows = loader.committed_rows();

        let finish = match &exit {
            Exit::Recovered => Finish::Recovered,
            Exit::Loaded => Finish::Loaded {
                rows: committed_rows,
            },
            Exit::Failed(error) => {
                metrics.increment_failures(1);
                error!(
                    chunk_id = chunk.id,
                    table = %chunk.table,
                    committed_rows,
                    error = %error,
                    "Chunk failed"
                );
                Finish::Failed {
                    error,
                    select: statement,
                    copy: loader.statement(),
                }
            }
        };

        let outcome = self.reporter.finalize(chunk, finish, lease).await;
        let settled = exit.settled();
        let metrics = metrics.snapshot();

        info!(
            chunk_id = chunk.id,
            settled = ?settled,
            committed_rows,
            batches = loader.committed_batches(),
            rows_encoded = metrics.rows_encoded,
            "Chunk attempt settled"
        );

        ChunkReport {
            chunk_id: chunk.id,
            exit: exit.path(),
            settled,
            outcome,
            committed_rows,
            batches: loader.committed_batches(),
            metrics,
            error: match &exit {
                Exit::Failed(error) => Some(error.to_string()),
                _ => None,
            },
        }
    }
}
