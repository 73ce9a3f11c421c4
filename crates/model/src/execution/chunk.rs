use serde::{Deserialize, Serialize};

/// One unit of work handed to a worker: a table (or row range of it) to transfer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Ledger identifier, unique and durable.
    pub id: i64,
    /// Target table name.
    pub table: String,
    /// Source column selection, already rendered as a query fragment.
    pub select_list: String,
    /// Row count the orchestrator expects this chunk to carry.
    pub expected_rows: u64,
}

impl Chunk {
    pub fn new(
        id: i64,
        table: impl Into<String>,
        select_list: impl Into<String>,
        expected_rows: u64,
    ) -> Self {
        Self {
            id,
            table: table.into(),
            select_list: select_list.into(),
            expected_rows,
        }
    }
}

/// The single notification sent to the orchestrator per chunk attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferOutcome {
    pub table: String,
    pub rows_loaded: u64,
}

impl TransferOutcome {
    pub fn new(table: impl Into<String>, rows_loaded: u64) -> Self {
        Self {
            table: table.into(),
            rows_loaded,
        }
    }

    pub fn empty(table: impl Into<String>) -> Self {
        Self::new(table, 0)
    }
}
