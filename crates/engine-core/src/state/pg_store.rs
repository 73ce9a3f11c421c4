use crate::{error::LedgerError, state::LedgerStore};
use async_trait::async_trait;
use connectors::sql::postgres::ledger::PgLedger;

/// The ledger table kept in the target database.
pub struct PgLedgerStore {
    ledger: PgLedger,
}

impl PgLedgerStore {
    pub fn new(ledger: PgLedger) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn delete_entry(&self, chunk_id: i64) -> Result<(), LedgerError> {
        self.ledger.delete_entry(chunk_id).await?;
        Ok(())
    }

    async fn entry_table(&self, chunk_id: i64) -> Result<Option<String>, LedgerError> {
        Ok(self.ledger.entry_table(chunk_id).await?)
    }
}
