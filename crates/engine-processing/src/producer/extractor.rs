use connectors::sql::base::error::DbError;
use engine_core::connectors::source::{RowSource, SourceConnection};
use model::records::row::RowData;
use tracing::debug;

/// What one pull on the extractor yields.
#[derive(Debug)]
pub enum Delivery {
    Row(RowData),
    /// The extractor is paused; the cursor was not polled.
    Paused,
    Exhausted,
    Failed(DbError),
}

/// A pausable view over a source cursor.
///
/// While paused the cursor is not polled at all, so no row reaches the
/// encoder until `resume`. Resuming delivers the next undelivered row. After
/// the cursor ends or fails the extractor stays exhausted.
pub struct SourceExtractor {
    source: Box<dyn RowSource>,
    paused: bool,
    exhausted: bool,
    delivered: u64,
}

impl SourceExtractor {
    pub fn new(source: Box<dyn RowSource>) -> Self {
        Self {
            source,
            paused: false,
            exhausted: false,
            delivered: 0,
        }
    }

    /// Runs `sql` on a dedicated source connection.
    pub async fn open(
        conn: Box<dyn SourceConnection>,
        sql: String,
        entity: String,
    ) -> Result<Self, DbError> {
        let source = conn.open_cursor(sql, entity).await?;
        Ok(Self::new(source))
    }

    pub fn pause(&mut self) {
        if !self.paused {
            debug!(delivered = self.delivered, "Extraction paused");
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            debug!(delivered = self.delivered, "Extraction resumed");
            self.paused = false;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Rows handed out so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub async fn next(&mut self) -> Delivery {
        if self.exhausted {
            return Delivery::Exhausted;
        }
        if self.paused {
            return Delivery::Paused;
        }

        match self.source.next_row().await {
            Some(Ok(row)) => {
                self.delivered += 1;
                Delivery::Row(row)
            }
            Some(Err(err)) => {
                self.exhausted = true;
                Delivery::Failed(err)
            }
            None => {
                self.exhausted = true;
                Delivery::Exhausted
            }
        }
    }
}
