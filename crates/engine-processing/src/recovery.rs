use crate::error::LoaderError;
use engine_core::state::ConsistencyCheck;
use std::sync::Arc;
use tracing::info;

/// Decides between the recovery path and a normal load.
pub struct RecoveryGate {
    check: Arc<dyn ConsistencyCheck>,
}

impl RecoveryGate {
    pub fn new(check: Arc<dyn ConsistencyCheck>) -> Self {
        Self { check }
    }

    /// True when a prior run already applied the chunk. Loading it again
    /// could duplicate committed rows, so the caller must only clean up.
    pub async fn is_recovery(&self, chunk_id: i64) -> Result<bool, LoaderError> {
        let applied = self
            .check
            .was_chunk_applied(chunk_id)
            .await
            .map_err(|source| LoaderError::ConsistencyCheck { chunk_id, source })?;

        if applied {
            info!(chunk_id, "Chunk already applied, taking recovery path");
        }
        Ok(applied)
    }
}
