use crate::connectors::{
    sink::TargetSession,
    source::{MySqlSourceConnection, SourceConnection},
};
use async_trait::async_trait;
use connectors::sql::{
    base::error::ConnectorError, mysql::adapter::MySqlAdapter, postgres::adapter::PgAdapter,
};
use tracing::debug;

/// Hands out the connections a chunk attempt runs on.
///
/// Target sessions are checked out with `acquire_target` and must come back
/// through `release_target` exactly once. Source connections are never
/// returned; they die with their cursor.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn acquire_source(&self) -> Result<Box<dyn SourceConnection>, ConnectorError>;

    async fn acquire_target(&self) -> Result<Box<dyn TargetSession>, ConnectorError>;

    async fn release_target(&self, session: Box<dyn TargetSession>);
}

/// MySQL source pool plus Postgres target pool.
#[derive(Clone)]
pub struct DbConnectionProvider {
    source: MySqlAdapter,
    target: PgAdapter,
}

impl DbConnectionProvider {
    pub fn new(source: MySqlAdapter, target: PgAdapter) -> Self {
        Self { source, target }
    }

    pub fn source(&self) -> &MySqlAdapter {
        &self.source
    }

    pub fn target(&self) -> &PgAdapter {
        &self.target
    }
}

#[async_trait]
impl ConnectionProvider for DbConnectionProvider {
    async fn acquire_source(&self) -> Result<Box<dyn SourceConnection>, ConnectorError> {
        let conn = self.source.get_conn().await?;
        Ok(Box::new(MySqlSourceConnection::new(
            self.source.clone(),
            conn,
        )))
    }

    async fn acquire_target(&self) -> Result<Box<dyn TargetSession>, ConnectorError> {
        let session = self.target.session().await?;
        Ok(Box::new(session))
    }

    async fn release_target(&self, session: Box<dyn TargetSession>) {
        // Dropping the pooled object returns it to the pool.
        drop(session);
        debug!("Target session returned to pool");
    }
}
