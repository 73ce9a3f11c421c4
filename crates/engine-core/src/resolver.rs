use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maps a target table back to the name it has in the source store.
pub trait TableNameResolver: Send + Sync {
    fn source_table(&self, table: &str) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRename {
    pub original: String,
    pub renamed: String,
}

/// Renames applied by earlier pipeline stages, keyed by the new name.
#[derive(Debug, Clone, Default)]
pub struct RenameMap {
    by_renamed: HashMap<String, String>,
}

impl RenameMap {
    pub fn new(renames: &[TableRename]) -> Self {
        let by_renamed = renames
            .iter()
            .map(|r| (r.renamed.clone(), r.original.clone()))
            .collect();
        Self { by_renamed }
    }
}

impl TableNameResolver for RenameMap {
    fn source_table(&self, table: &str) -> String {
        self.by_renamed
            .get(table)
            .cloned()
            .unwrap_or_else(|| table.to_string())
    }
}
