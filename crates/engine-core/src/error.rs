use connectors::sql::base::{encoder::EncodeError, error::DbError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Target schema must not be empty")]
    EmptySchema,

    #[error("Batch size must be a positive number of rows")]
    InvalidBatchSize,

    #[error("Invalid delimiter: {0}")]
    InvalidDelimiter(#[from] EncodeError),
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Ledger storage failed: {0}")]
    Storage(#[from] sled::Error),

    #[error("Failed to (de)serialize ledger entry: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Ledger query failed: {0}")]
    Database(#[from] DbError),
}

#[derive(Error, Debug)]
pub enum ConsistencyError {
    #[error("Failed to read ledger entry: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Failed to probe target table '{table}': {source}")]
    Probe {
        table: String,
        #[source]
        source: DbError,
    },
}

#[derive(Error, Debug)]
pub enum LogError {
    #[error("Failed to write log file: {0}")]
    Io(#[from] std::io::Error),
}
