use async_trait::async_trait;
use connectors::sql::{base::error::DbError, postgres::session::PgSession};
use model::execution::mode::IntegrityMode;

/// The target connection as the loader sees it.
///
/// Methods take `&mut self`: a session is owned by one chunk attempt and
/// carries at most one COPY channel at a time.
#[async_trait]
pub trait TargetSession: Send {
    /// Current integrity-enforcement mode of the session.
    async fn integrity_mode(&mut self) -> Result<IntegrityMode, DbError>;

    async fn set_integrity_mode(&mut self, mode: IntegrityMode) -> Result<(), DbError>;

    /// Opens one bulk-copy channel, pushes every record, and closes it.
    /// All records commit together or none do. Returns the rows copied.
    async fn copy_in(&mut self, statement: &str, records: &[String]) -> Result<u64, DbError>;
}

#[async_trait]
impl TargetSession for PgSession {
    async fn integrity_mode(&mut self) -> Result<IntegrityMode, DbError> {
        self.replication_role().await
    }

    async fn set_integrity_mode(&mut self, mode: IntegrityMode) -> Result<(), DbError> {
        self.set_replication_role(mode).await
    }

    async fn copy_in(&mut self, statement: &str, records: &[String]) -> Result<u64, DbError> {
        self.copy_records(statement, records).await
    }
}
