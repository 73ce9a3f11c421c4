use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Whether the migration creates schema objects alongside the data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationMode {
    /// Tables, constraints and data.
    #[default]
    Full,
    /// Data into an existing schema; referential checks must be bypassed.
    DataOnly,
}

impl MigrationMode {
    pub fn is_data_only(&self) -> bool {
        matches!(self, MigrationMode::DataOnly)
    }
}

/// Postgres `session_replication_role`. `Replica` suppresses ordinary
/// triggers, which includes the ones backing foreign keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityMode {
    #[default]
    Origin,
    Replica,
    Local,
}

impl IntegrityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrityMode::Origin => "origin",
            IntegrityMode::Replica => "replica",
            IntegrityMode::Local => "local",
        }
    }
}

impl fmt::Display for IntegrityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unknown integrity mode: {0}")]
pub struct ParseIntegrityModeError(pub String);

impl FromStr for IntegrityMode {
    type Err = ParseIntegrityModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "origin" => Ok(IntegrityMode::Origin),
            "replica" => Ok(IntegrityMode::Replica),
            "local" => Ok(IntegrityMode::Local),
            other => Err(ParseIntegrityModeError(other.to_string())),
        }
    }
}
