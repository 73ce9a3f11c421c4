use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Transfer one chunk and print its outcome as a JSON line
    Load {
        #[arg(long, help = "Config file path")]
        config: PathBuf,

        #[arg(long, help = "Ledger identifier of the chunk")]
        chunk_id: i64,

        #[arg(long, help = "Target table name")]
        table: String,

        #[arg(long, help = "Source column selection, e.g. \"`id`, `name`\"")]
        columns: String,

        #[arg(long, default_value_t = 0, help = "Expected row count")]
        rows: u64,
    },
    /// Check that source and target from the config file are reachable
    TestConn {
        #[arg(long, help = "Config file path")]
        config: PathBuf,
    },
    /// Inspect or edit the local sled ledger
    Ledger {
        #[arg(long, help = "Ledger directory, defaults to ~/.sluice/ledger")]
        path: Option<PathBuf>,

        #[command(subcommand)]
        command: LedgerCommand,
    },
}

#[derive(Subcommand)]
pub enum LedgerCommand {
    /// Record a pending chunk
    Add {
        #[arg(long)]
        chunk_id: i64,

        #[arg(long)]
        table: String,

        #[arg(long)]
        columns: String,

        #[arg(long, default_value_t = 0)]
        rows: u64,
    },
    /// Print pending chunks as JSON lines
    List,
    /// Drop a chunk's entry
    Remove {
        #[arg(long)]
        chunk_id: i64,
    },
}
