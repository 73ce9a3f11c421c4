use crate::error::CliError;
use engine_core::context::global::MigrationSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TARGET_POOL_SIZE: usize = 4;

/// Where pending chunks are recorded.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerConfig {
    /// The ledger table in the target database.
    #[default]
    Postgres,
    /// A local sled tree; defaults to `~/.sluice/ledger`.
    Sled { path: Option<PathBuf> },
}

/// Worker configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct LoaderConfig {
    pub source_url: String,
    pub target_url: String,

    /// The ledger and the consistency probe check out their own sessions
    /// while a chunk holds one, so this must be at least 2.
    #[serde(default = "default_pool_size")]
    pub target_pool_size: usize,

    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(flatten)]
    pub settings: MigrationSettings,
}

fn default_pool_size() -> usize {
    DEFAULT_TARGET_POOL_SIZE
}

impl LoaderConfig {
    pub async fn load(path: &Path) -> Result<Self, CliError> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, CliError> {
        let config: LoaderConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), CliError> {
        if self.target_pool_size < 2 {
            return Err(CliError::InvalidConfig(format!(
                "target_pool_size must be at least 2, got {}",
                self.target_pool_size
            )));
        }
        self.settings.validate()?;
        Ok(())
    }
}

pub fn default_ledger_path() -> Result<PathBuf, CliError> {
    let home = dirs::home_dir()
        .ok_or_else(|| CliError::Unexpected("Could not determine home directory".into()))?;
    Ok(home.join(".sluice/ledger"))
}
