use crate::sql::{
    base::error::DbError,
    postgres::adapter::PgAdapter,
};
use model::core::utils::quote_pg_ident;
use tracing::debug;

/// Access to the durable chunk ledger kept in the target database.
///
/// One row per pending chunk: `id` plus a JSON `metadata` document that
/// names the target table.
#[derive(Clone)]
pub struct PgLedger {
    adapter: PgAdapter,
    table: String,
}

impl PgLedger {
    pub fn new(adapter: PgAdapter, schema: &str, source_db: &str) -> Self {
        Self {
            adapter,
            table: ledger_table(schema, source_db),
        }
    }

    /// Deletes the chunk's row. Deleting an absent row is not an error.
    pub async fn delete_entry(&self, chunk_id: i64) -> Result<u64, DbError> {
        let sql = format!("DELETE FROM {} WHERE id = $1::bigint;", self.table);
        let session = self.adapter.session().await?;
        let deleted = session.execute(&sql, &[&chunk_id]).await?;
        debug!(chunk_id, deleted, "Ledger entry deleted");
        Ok(deleted)
    }

    /// Target table recorded for the chunk, `None` if the entry is gone.
    pub async fn entry_table(&self, chunk_id: i64) -> Result<Option<String>, DbError> {
        let sql = format!(
            "SELECT metadata::text FROM {} WHERE id = $1::bigint;",
            self.table
        );
        let session = self.adapter.session().await?;
        let Some(raw) = session.query_opt_text(&sql, &[&chunk_id]).await? else {
            return Ok(None);
        };

        table_from_metadata(&raw).map(Some)
    }
}

pub fn ledger_table(schema: &str, source_db: &str) -> String {
    format!(
        "{}.{}",
        quote_pg_ident(schema),
        quote_pg_ident(&format!("data_pool_{schema}{source_db}"))
    )
}

pub(crate) fn table_from_metadata(raw: &str) -> Result<String, DbError> {
    let metadata: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| DbError::Conversion(format!("ledger metadata is not JSON: {e}")))?;

    ["_tableName", "table"]
        .iter()
        .find_map(|key| metadata.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
        .ok_or_else(|| DbError::Conversion("ledger metadata has no table name".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_table_is_schema_qualified() {
        assert_eq!(
            ledger_table("public", "shop"),
            r#""public"."data_pool_publicshop""#
        );
    }

    #[test]
    fn reads_table_name_from_metadata() {
        let raw = r#"{"_tableName":"orders","_selectFieldList":"`id`","_rowsCnt":3}"#;
        assert_eq!(table_from_metadata(raw).unwrap(), "orders");
        assert_eq!(table_from_metadata(r#"{"table":"users"}"#).unwrap(), "users");
        assert!(table_from_metadata(r#"{"rows":1}"#).is_err());
        assert!(table_from_metadata("not json").is_err());
    }
}
