use crate::error::LogError;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::{error, info, warn};

const GENERAL_LOG: &str = "all.log";
const ERRORS_LOG: &str = "errors-only.log";

/// File-backed migration log.
///
/// Everything goes to `all.log`; errors also go to `errors-only.log`.
/// Per-table rejected-data records live next to them as `{table}.log`.
/// A failed write is traced and swallowed, logging never fails a chunk.
#[derive(Debug, Clone)]
pub struct MigrationLog {
    dir: PathBuf,
}

impl MigrationLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `{table}.log` inside the log directory. Separators in the table name
    /// are flattened so the file can never land outside it.
    pub fn table_log_path(&self, table: &str) -> PathBuf {
        let name: String = table
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':' | '\0') { '_' } else { c })
            .collect();
        self.dir.join(format!("{name}.log"))
    }

    /// Appends `message` to `all.log`, or to `file` when one is given.
    pub async fn log(&self, message: &str, file: Option<&Path>) {
        info!(target: "migration_log", "{message}");
        let path = file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.dir.join(GENERAL_LOG));
        self.append_or_trace(&path, &stamp(message)).await;
    }

    /// Appends the error and its statement to both `all.log` and `errors-only.log`.
    pub async fn record_error(&self, message: &str, statement: Option<&str>) {
        error!(target: "migration_log", statement = statement.unwrap_or(""), "{message}");
        let mut entry = stamp(message);
        if let Some(sql) = statement {
            entry.push_str(&format!("\tSQL: {sql}\n"));
        }
        self.append_or_trace(&self.dir.join(GENERAL_LOG), &entry)
            .await;
        self.append_or_trace(&self.dir.join(ERRORS_LOG), &entry)
            .await;
    }

    async fn append_or_trace(&self, path: &Path, entry: &str) {
        if let Err(err) = self.append(path, entry).await {
            warn!(path = %path.display(), %err, "Failed to write migration log");
        }
    }

    async fn append(&self, path: &Path, entry: &str) -> Result<(), LogError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(entry.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

fn stamp(message: &str) -> String {
    format!("[{}] {message}\n", Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"))
}
