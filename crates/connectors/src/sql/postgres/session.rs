use crate::sql::base::error::DbError;
use bytes::{Bytes, BytesMut};
use deadpool_postgres::Object;
use futures_util::{SinkExt, pin_mut};
use model::{core::utils::quote_pg_ident, execution::mode::IntegrityMode};
use tokio_postgres::{CopyInSink, types::ToSql};
use tracing::debug;

/// Bytes accumulated before a CopyData message is pushed to the server.
const COPY_FLUSH_BYTES: usize = 1024 * 1024;

/// One pooled Postgres connection, owned by a single chunk attempt.
pub struct PgSession {
    client: Object,
}

impl PgSession {
    pub(crate) fn new(client: Object) -> Self {
        Self { client }
    }

    pub async fn exec(&self, sql: &str) -> Result<(), DbError> {
        self.client.batch_execute(sql).await?;
        Ok(())
    }

    pub async fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, DbError> {
        Ok(self.client.execute(sql, params).await?)
    }

    pub async fn query_opt_text(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<String>, DbError> {
        let row = self.client.query_opt(sql, params).await?;
        Ok(match row {
            Some(row) => row.try_get::<_, Option<String>>(0)?,
            None => None,
        })
    }

    pub async fn has_rows(&self, schema: &str, table: &str) -> Result<bool, DbError> {
        let sql = format!(
            "SELECT 1 FROM {}.{} LIMIT 1",
            quote_pg_ident(schema),
            quote_pg_ident(table)
        );
        Ok(self.client.query_opt(&sql, &[]).await?.is_some())
    }

    pub async fn replication_role(&self) -> Result<IntegrityMode, DbError> {
        let row = self
            .client
            .query_one("SHOW session_replication_role", &[])
            .await?;
        let role: String = row.try_get(0)?;
        role.parse()
            .map_err(|e: model::execution::mode::ParseIntegrityModeError| {
                DbError::Conversion(e.to_string())
            })
    }

    pub async fn set_replication_role(&self, mode: IntegrityMode) -> Result<(), DbError> {
        // The role is one of three fixed keywords, never user input.
        let sql = format!("SET session_replication_role = {};", mode.as_str());
        self.client.batch_execute(&sql).await?;
        Ok(())
    }

    /// Streams pre-encoded records through one `COPY ... FROM STDIN`.
    ///
    /// The server applies the whole COPY or nothing. If any send fails the
    /// sink is dropped unfinished, which aborts the statement.
    pub async fn copy_records(&self, statement: &str, records: &[String]) -> Result<u64, DbError> {
        debug!(statement = %statement, records = records.len(), "Opening COPY channel");

        let sink: CopyInSink<Bytes> = self.client.copy_in(statement).await?;
        pin_mut!(sink);

        let mut buf = BytesMut::with_capacity(COPY_FLUSH_BYTES);
        for record in records {
            buf.extend_from_slice(record.as_bytes());
            if buf.len() >= COPY_FLUSH_BYTES {
                sink.as_mut().send(buf.split().freeze()).await?;
            }
        }
        if !buf.is_empty() {
            sink.as_mut().send(buf.split().freeze()).await?;
        }

        let copied = sink.as_mut().finish().await?;
        Ok(copied)
    }
}
