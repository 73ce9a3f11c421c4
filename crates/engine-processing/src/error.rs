use connectors::sql::base::{
    encoder::EncodeError,
    error::{ConnectorError, DbError},
};
use engine_core::error::ConsistencyError;
use thiserror::Error;

/// Chunk-fatal failures. Each one ends the attempt on the failure path.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read rows of '{table}' from source: {source}")]
    Retrieval {
        table: String,
        #[source]
        source: DbError,
    },

    #[error("Failed to encode row {row} of '{table}': {source}")]
    Encoding {
        table: String,
        row: u64,
        #[source]
        source: EncodeError,
    },

    #[error("Bulk copy of batch {batch} into '{table}' failed: {source}")]
    Load {
        table: String,
        batch: u64,
        #[source]
        source: DbError,
    },

    #[error("Consistency check for chunk {chunk_id} failed: {source}")]
    ConsistencyCheck {
        chunk_id: i64,
        #[source]
        source: ConsistencyError,
    },

    #[error("Connection unavailable: {0}")]
    Connection(#[from] ConnectorError),
}

/// Reading or switching the session integrity mode failed. Never fatal.
#[derive(Error, Debug)]
pub enum IntegrityControlError {
    #[error("Failed to read session integrity mode: {0}")]
    Capture(#[source] DbError),

    #[error("Failed to suspend integrity enforcement: {0}")]
    Suspend(#[source] DbError),

    #[error("Failed to restore integrity mode '{mode}': {source}")]
    Restore {
        mode: String,
        #[source]
        source: DbError,
    },
}
