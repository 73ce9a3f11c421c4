use crate::sql::{
    base::error::{ConnectorError, DbError},
    postgres::{session::PgSession, utils::build_pool},
};
use deadpool_postgres::Pool;
use tracing::debug;

#[derive(Clone)]
pub struct PgAdapter {
    pool: Pool,
}

impl PgAdapter {
    pub fn connect(url: &str, max_size: usize) -> Result<Self, ConnectorError> {
        let pool = build_pool(url, max_size)?;
        Ok(PgAdapter { pool })
    }

    /// Checks a session out of the pool; dropping the session returns it.
    pub async fn session(&self) -> Result<PgSession, DbError> {
        let client = self.pool.get().await?;
        debug!(status = ?self.pool.status(), "Acquired Postgres session");
        Ok(PgSession::new(client))
    }

    pub async fn ping(&self) -> Result<(), DbError> {
        let session = self.session().await?;
        session.exec("SELECT 1").await
    }

    pub fn close(&self) {
        self.pool.close();
    }
}
