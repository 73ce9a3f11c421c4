use crate::{
    error::ConsistencyError,
    state::{ConsistencyCheck, LedgerStore},
};
use async_trait::async_trait;
use connectors::sql::{base::error::DbError, postgres::adapter::PgAdapter};
use std::sync::Arc;
use tracing::debug;

/// Decides recovery by probing the chunk's target table.
///
/// A chunk whose ledger entry is already gone was finalized by an earlier
/// run. Otherwise any row in the target table counts as applied. The probe
/// only answers per table, so it is sound when a table maps to one chunk.
pub struct PgConsistencyCheck {
    ledger: Arc<dyn LedgerStore>,
    target: PgAdapter,
    schema: String,
}

impl PgConsistencyCheck {
    pub fn new(ledger: Arc<dyn LedgerStore>, target: PgAdapter, schema: impl Into<String>) -> Self {
        Self {
            ledger,
            target,
            schema: schema.into(),
        }
    }

    async fn probe(&self, table: &str) -> Result<bool, DbError> {
        let session = self.target.session().await?;
        session.has_rows(&self.schema, table).await
    }
}

#[async_trait]
impl ConsistencyCheck for PgConsistencyCheck {
    async fn was_chunk_applied(&self, chunk_id: i64) -> Result<bool, ConsistencyError> {
        let Some(table) = self.ledger.entry_table(chunk_id).await? else {
            debug!(chunk_id, "No ledger entry, chunk already finalized");
            return Ok(true);
        };

        let applied = self
            .probe(&table)
            .await
            .map_err(|source| ConsistencyError::Probe {
                table: table.clone(),
                source,
            })?;

        debug!(chunk_id, table = %table, applied, "Consistency probe finished");
        Ok(applied)
    }
}
