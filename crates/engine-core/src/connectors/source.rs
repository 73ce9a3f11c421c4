use async_trait::async_trait;
use connectors::sql::{
    base::error::DbError,
    mysql::{adapter::MySqlAdapter, source::MySqlCursor},
};
use model::records::row::RowData;
use mysql_async::Conn;

/// A lazy, finite, non-restartable sequence of source rows.
#[async_trait]
pub trait RowSource: Send {
    /// Next row; `None` once exhausted. After an `Err` no further rows follow.
    async fn next_row(&mut self) -> Option<Result<RowData, DbError>>;
}

/// A source connection dedicated to one chunk.
#[async_trait]
pub trait SourceConnection: Send {
    /// Runs `sql` and hands back its cursor. The connection is consumed: it
    /// lives as long as the cursor and is torn down, never pooled, after it.
    async fn open_cursor(
        self: Box<Self>,
        sql: String,
        entity: String,
    ) -> Result<Box<dyn RowSource>, DbError>;
}

pub struct MySqlSourceConnection {
    adapter: MySqlAdapter,
    conn: Conn,
}

impl MySqlSourceConnection {
    pub fn new(adapter: MySqlAdapter, conn: Conn) -> Self {
        Self { adapter, conn }
    }
}

#[async_trait]
impl SourceConnection for MySqlSourceConnection {
    async fn open_cursor(
        self: Box<Self>,
        sql: String,
        entity: String,
    ) -> Result<Box<dyn RowSource>, DbError> {
        Ok(Box::new(MySqlCursor::open(
            self.adapter,
            self.conn,
            sql,
            entity,
        )))
    }
}

#[async_trait]
impl RowSource for MySqlCursor {
    async fn next_row(&mut self) -> Option<Result<RowData, DbError>> {
        self.next().await
    }
}
