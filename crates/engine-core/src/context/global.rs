use crate::{error::SettingsError, resolver::TableRename};
use connectors::sql::postgres::encoder::validate_delimiter;
use model::execution::mode::MigrationMode;
use serde::{Deserialize, Serialize};
use std::{num::NonZeroUsize, path::PathBuf};

const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Migration-wide settings every chunk attempt is run with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationSettings {
    /// Target schema the tables live in.
    pub schema: String,

    /// Field delimiter of the bulk-load text format.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Watermark: rows per bulk-copy batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default)]
    pub mode: MigrationMode,

    /// Where `all.log`, `errors-only.log` and per-table rejected-data logs go.
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,

    /// Source database name; part of the ledger table name.
    #[serde(default)]
    pub source_db_name: String,

    #[serde(default)]
    pub table_renames: Vec<TableRename>,
}

fn default_delimiter() -> char {
    ','
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl MigrationSettings {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            delimiter: default_delimiter(),
            batch_size: default_batch_size(),
            mode: MigrationMode::default(),
            logs_dir: default_logs_dir(),
            source_db_name: String::new(),
            table_renames: Vec::new(),
        }
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_mode(mut self, mode: MigrationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_logs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.logs_dir = dir.into();
        self
    }

    pub fn with_source_db_name(mut self, name: impl Into<String>) -> Self {
        self.source_db_name = name.into();
        self
    }

    pub fn with_renames(mut self, renames: Vec<TableRename>) -> Self {
        self.table_renames = renames;
        self
    }

    pub fn watermark(&self) -> Result<NonZeroUsize, SettingsError> {
        NonZeroUsize::new(self.batch_size).ok_or(SettingsError::InvalidBatchSize)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.schema.trim().is_empty() {
            return Err(SettingsError::EmptySchema);
        }
        self.watermark()?;
        validate_delimiter(self.delimiter)?;
        Ok(())
    }
}
