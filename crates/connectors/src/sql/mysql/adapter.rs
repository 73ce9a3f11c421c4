use crate::sql::base::error::{ConnectorError, DbError};
use mysql_async::{Conn, Opts, Pool, prelude::Queryable};
use tracing::debug;

#[derive(Clone)]
pub struct MySqlAdapter {
    pool: Pool,
}

impl MySqlAdapter {
    pub fn connect(url: &str) -> Result<Self, ConnectorError> {
        let opts = Opts::from_url(url).map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;
        Ok(MySqlAdapter {
            pool: Pool::new(opts),
        })
    }

    /// Checks a connection out of the pool. The caller owns it from here on.
    pub async fn get_conn(&self) -> Result<Conn, DbError> {
        let conn = self.pool.get_conn().await?;
        debug!(conn_id = conn.id(), "Acquired MySQL connection");
        Ok(conn)
    }

    pub async fn ping(&self) -> Result<(), DbError> {
        let mut conn = self.get_conn().await?;
        conn.ping().await?;
        Ok(())
    }

    /// Ends another session server-side, abandoning whatever it was streaming.
    pub async fn kill(&self, conn_id: u32) -> Result<(), DbError> {
        let mut conn = self.get_conn().await?;
        conn.query_drop(format!("KILL CONNECTION {conn_id}")).await?;
        debug!(conn_id, "Killed MySQL connection");
        Ok(())
    }

    /// Closes every idle connection; in-flight ones close when dropped.
    pub async fn disconnect(self) -> Result<(), DbError> {
        self.pool.disconnect().await?;
        Ok(())
    }
}
