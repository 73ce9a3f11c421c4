use chrono::{DateTime, Utc};
use model::execution::chunk::Chunk;
use serde::{Deserialize, Serialize};

/// A pending chunk as kept by the local ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerEntry {
    pub chunk: Chunk,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(chunk: Chunk) -> Self {
        Self {
            chunk,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> i64 {
        self.chunk.id
    }
}
