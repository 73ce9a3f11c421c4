use connectors::sql::base::error::{ConnectorError, DbError};
use engine_core::error::{LedgerError, SettingsError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read the configuration file: {0}")]
    ConfigFileRead(#[from] std::io::Error),

    #[error("Failed to deserialize the configuration file as JSON: {0}")]
    ConfigDeserialize(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid migration settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Failed to set up connection: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),

    #[error("Chunk {chunk_id} failed: {reason}")]
    ChunkFailed { chunk_id: i64, reason: String },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}
