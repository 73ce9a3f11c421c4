use crate::sql::{
    base::{error::DbError, row::mysql_row_to_data},
    mysql::adapter::MySqlAdapter,
};
use futures_util::TryStreamExt;
use model::records::row::RowData;
use mysql_async::{Conn, Row, prelude::Queryable};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Rows buffered between the reader task and the consumer. One row can sit in
/// the channel while the consumer is not pulling.
const CURSOR_CAPACITY: usize = 1;

/// A forward-only streaming cursor over one SELECT.
///
/// The query runs in its own task on a connection the cursor owns outright.
/// When the result set is exhausted or fails, that connection is torn down
/// instead of going back to the pool. When the consumer hangs up early the
/// session is killed through `adapter`, so the server stops sending rows.
pub struct MySqlCursor {
    rx: mpsc::Receiver<Result<RowData, DbError>>,
}

impl MySqlCursor {
    pub fn open(adapter: MySqlAdapter, conn: Conn, sql: String, entity: String) -> Self {
        let (tx, rx) = mpsc::channel(CURSOR_CAPACITY);

        tokio::spawn(async move {
            let mut conn = conn;
            match pump(&mut conn, &sql, &entity, &tx).await {
                Ok(Pumped::Abandoned) => {
                    // Disconnecting, or handing back to the pool, would drain
                    // the rest of the result set first.
                    let conn_id = conn.id();
                    if let Err(err) = adapter.kill(conn_id).await {
                        warn!(entity = %entity, conn_id, %err, "Failed to kill abandoned source query");
                    }
                    debug!(entity = %entity, conn_id, "Source connection abandoned mid-result");
                    return;
                }
                Ok(Pumped::Exhausted) => {}
                Err(e) => {
                    error!(entity = %entity, error = %e, "Source cursor failed");
                    // The receiver may already be gone; nothing else to tell.
                    let _ = tx.send(Err(e)).await;
                }
            }
            drop(tx);

            if let Err(err) = conn.disconnect().await {
                warn!(entity = %entity, %err, "Failed to tear down source connection");
            } else {
                debug!(entity = %entity, "Source connection torn down");
            }
        });

        Self { rx }
    }

    /// Next row, `None` once the cursor is exhausted or has reported its error.
    pub async fn next(&mut self) -> Option<Result<RowData, DbError>> {
        self.rx.recv().await
    }
}

/// How the reader task stopped.
#[derive(Debug, PartialEq, Eq)]
enum Pumped {
    /// The result set was read to the end.
    Exhausted,
    /// The consumer hung up with rows still pending.
    Abandoned,
}

async fn pump(
    conn: &mut Conn,
    sql: &str,
    entity: &str,
    tx: &mpsc::Sender<Result<RowData, DbError>>,
) -> Result<Pumped, DbError> {
    debug!(entity = %entity, sql = %sql, "Opening source cursor");

    let mut result = conn.query_iter(sql).await?;
    let Some(mut stream) = result.stream::<Row>().await? else {
        return Ok(Pumped::Exhausted);
    };

    while let Some(row) = stream.try_next().await? {
        let data = mysql_row_to_data(row, entity);
        if tx.send(Ok(data)).await.is_err() {
            debug!(entity = %entity, "Cursor consumer went away, stopping");
            return Ok(Pumped::Abandoned);
        }
    }

    Ok(Pumped::Exhausted)
}
