use connectors::sql::base::error::DbError;
use engine_core::connectors::sink::TargetSession;
use model::{
    core::utils::{quote_pg_ident, quote_pg_literal},
    records::batch::Batch,
};
use tracing::{debug, info};

/// Streams batches into one target table, one COPY channel per batch.
pub struct BulkLoader {
    table: String,
    statement: String,
    committed_rows: u64,
    committed_batches: u64,
}

impl BulkLoader {
    pub fn new(schema: &str, table: &str, delimiter: char) -> Self {
        Self {
            table: table.to_string(),
            statement: copy_statement(schema, table, delimiter),
            committed_rows: 0,
            committed_batches: 0,
        }
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn committed_rows(&self) -> u64 {
        self.committed_rows
    }

    pub fn committed_batches(&self) -> u64 {
        self.committed_batches
    }

    /// Copies the whole batch through one channel. The batch commits as a
    /// unit or not at all; earlier batches stay committed either way.
    pub async fn load(
        &mut self,
        session: &mut dyn TargetSession,
        batch: &Batch,
    ) -> Result<u64, DbError> {
        debug!(
            table = %self.table,
            batch = batch.sequence(),
            rows = batch.len(),
            bytes = batch.size_bytes(),
            "Draining batch"
        );

        let copied = session.copy_in(&self.statement, batch.records()).await?;

        self.committed_rows += copied;
        self.committed_batches += 1;
        info!(
            table = %self.table,
            batch = batch.sequence(),
            rows = copied,
            total = self.committed_rows,
            "Batch committed"
        );
        Ok(copied)
    }
}

pub fn copy_statement(schema: &str, table: &str, delimiter: char) -> String {
    format!(
        "COPY {}.{} FROM STDIN WITH (FORMAT csv, DELIMITER {}, NULL '\\N');",
        quote_pg_ident(schema),
        quote_pg_ident(table),
        quote_pg_literal(&delimiter.to_string())
    )
}
