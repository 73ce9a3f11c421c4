use crate::{
    commands::{Commands, LedgerCommand},
    config::{LedgerConfig, LoaderConfig, default_ledger_path},
    error::CliError,
};
use clap::Parser;
use connectors::sql::{
    mysql::adapter::MySqlAdapter,
    postgres::{adapter::PgAdapter, ledger::PgLedger},
};
use engine_core::{
    connectors::provider::DbConnectionProvider,
    log::MigrationLog,
    resolver::RenameMap,
    state::{
        LedgerStore, consistency::PgConsistencyCheck, models::LedgerEntry,
        pg_store::PgLedgerStore, sled_store::SledLedgerStore,
    },
};
use engine_processing::chunk::{ChunkProcessor, Collaborators, state::ExitPath};
use model::execution::chunk::Chunk;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod conn;
mod error;
mod output;

#[derive(Parser)]
#[command(name = "sluice", version = "0.1.0", about = "Chunked MySQL to Postgres bulk loader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // stdout carries outcome lines only
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Load {
            config,
            chunk_id,
            table,
            columns,
            rows,
        } => {
            let config = LoaderConfig::load(&config).await?;
            load_chunk(config, Chunk::new(chunk_id, table, columns, rows)).await?;
        }
        Commands::TestConn { config } => {
            let config = LoaderConfig::load(&config).await?;
            conn::ping_all(&config).await?;
        }
        Commands::Ledger { path, command } => {
            let store = open_sled_ledger(path)?;
            match command {
                LedgerCommand::Add {
                    chunk_id,
                    table,
                    columns,
                    rows,
                } => {
                    store.put(&LedgerEntry::new(Chunk::new(chunk_id, table, columns, rows)))?;
                    info!(chunk_id, "Chunk recorded in ledger");
                }
                LedgerCommand::List => {
                    for entry in store.list()? {
                        output::print_json_line(&entry)?;
                    }
                }
                LedgerCommand::Remove { chunk_id } => {
                    let removed = store.remove(chunk_id)?;
                    info!(chunk_id, removed, "Ledger entry removed");
                }
            }
        }
    }

    Ok(())
}

async fn load_chunk(config: LoaderConfig, chunk: Chunk) -> Result<(), CliError> {
    let settings = config.settings;
    let source = MySqlAdapter::connect(&config.source_url)?;
    let target = PgAdapter::connect(&config.target_url, config.target_pool_size)?;

    let ledger: Arc<dyn LedgerStore> = match config.ledger {
        LedgerConfig::Postgres => Arc::new(PgLedgerStore::new(PgLedger::new(
            target.clone(),
            &settings.schema,
            &settings.source_db_name,
        ))),
        LedgerConfig::Sled { path } => Arc::new(open_sled_ledger(path)?),
    };

    let (tx, rx) = mpsc::channel(1);
    let printer = tokio::spawn(output::print_outcomes(rx));

    let processor = ChunkProcessor::new(
        settings.clone(),
        Collaborators {
            provider: Arc::new(DbConnectionProvider::new(source.clone(), target.clone())),
            check: Arc::new(PgConsistencyCheck::new(
                ledger.clone(),
                target.clone(),
                &settings.schema,
            )),
            ledger,
            resolver: Arc::new(RenameMap::new(&settings.table_renames)),
            log: MigrationLog::new(&settings.logs_dir),
            outcomes: tx,
        },
    )?;

    let report = processor.process(chunk).await;
    // Closes the outcome channel so the printer finishes.
    drop(processor);

    printer
        .await
        .map_err(|e| CliError::Unexpected(format!("Outcome printer panicked: {e}")))??;

    target.close();
    source.disconnect().await?;

    info!(
        chunk_id = report.chunk_id,
        exit = ?report.exit,
        committed_rows = report.committed_rows,
        batches = report.batches,
        "Worker finished"
    );

    match report.exit {
        ExitPath::Failed => Err(CliError::ChunkFailed {
            chunk_id: report.chunk_id,
            reason: report.error.unwrap_or_default(),
        }),
        ExitPath::Loaded | ExitPath::Recovered => Ok(()),
    }
}

fn open_sled_ledger(path: Option<PathBuf>) -> Result<SledLedgerStore, CliError> {
    let path = match path {
        Some(path) => path,
        None => default_ledger_path()?,
    };
    Ok(SledLedgerStore::open(&path)?)
}
