use crate::error::{ConsistencyError, LedgerError};
use async_trait::async_trait;

pub mod consistency;
pub mod models;
pub mod pg_store;
pub mod sled_store;

/// The durable record of pending chunks.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Removes the chunk's entry. Removing an absent entry succeeds.
    async fn delete_entry(&self, chunk_id: i64) -> Result<(), LedgerError>;

    /// Target table recorded for the chunk, `None` once the entry is gone.
    async fn entry_table(&self, chunk_id: i64) -> Result<Option<String>, LedgerError>;
}

/// Tells a chunk interrupted after committing apart from fresh work.
#[async_trait]
pub trait ConsistencyCheck: Send + Sync {
    async fn was_chunk_applied(&self, chunk_id: i64) -> Result<bool, ConsistencyError>;
}
