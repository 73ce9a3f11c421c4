use crate::{
    error::LedgerError,
    state::{LedgerStore, models::LedgerEntry},
};
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// A ledger kept in a local sled tree, for runs without a shared database ledger.
pub struct SledLedgerStore {
    db: sled::Db,
}

impl SledLedgerStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Big-endian keys keep entries ordered by chunk id.
    #[inline]
    fn key(chunk_id: i64) -> [u8; 8] {
        chunk_id.to_be_bytes()
    }

    pub fn put(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        let bytes = bincode::serialize(entry)?;
        self.db.insert(Self::key(entry.id()), bytes)?;
        self.db.flush()?;
        Ok(())
    }

    pub fn get(&self, chunk_id: i64) -> Result<Option<LedgerEntry>, LedgerError> {
        match self.db.get(Self::key(chunk_id))? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn list(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        let mut entries = Vec::new();
        for item in self.db.iter() {
            let (_key, value) = item?;
            entries.push(bincode::deserialize(&value)?);
        }
        Ok(entries)
    }

    pub fn remove(&self, chunk_id: i64) -> Result<bool, LedgerError> {
        let removed = self.db.remove(Self::key(chunk_id))?.is_some();
        self.db.flush()?;
        Ok(removed)
    }
}

#[async_trait]
impl LedgerStore for SledLedgerStore {
    async fn delete_entry(&self, chunk_id: i64) -> Result<(), LedgerError> {
        let removed = self.remove(chunk_id)?;
        debug!(chunk_id, removed, "Local ledger entry deleted");
        Ok(())
    }

    async fn entry_table(&self, chunk_id: i64) -> Result<Option<String>, LedgerError> {
        Ok(self.get(chunk_id)?.map(|entry| entry.chunk.table))
    }
}
