use crate::error::LoaderError;
use model::records::row::RowData;
use serde::Serialize;

/// Where a running chunk attempt stands.
///
/// `Extracting`, `Buffering` and `Draining` cycle while rows flow. Every exit
/// passes through `Restoring`, after which the attempt is [`Settled`].
#[derive(Debug)]
pub enum LoadState {
    Extracting,
    Buffering(RowData),
    Draining,
    Restoring(Exit),
}

impl LoadState {
    pub fn name(&self) -> &'static str {
        match self {
            LoadState::Extracting => "extracting",
            LoadState::Buffering(_) => "buffering",
            LoadState::Draining => "draining",
            LoadState::Restoring(_) => "restoring",
        }
    }
}

/// Terminal state of an attempt, reached once cleanup ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Settled {
    Done,
    Failed,
}

/// Why the attempt is being wound down.
#[derive(Debug)]
pub enum Exit {
    Recovered,
    Loaded,
    Failed(LoaderError),
}

impl Exit {
    pub fn path(&self) -> ExitPath {
        match self {
            Exit::Recovered => ExitPath::Recovered,
            Exit::Loaded => ExitPath::Loaded,
            Exit::Failed(_) => ExitPath::Failed,
        }
    }

    pub fn settled(&self) -> Settled {
        match self {
            Exit::Failed(_) => Settled::Failed,
            Exit::Recovered | Exit::Loaded => Settled::Done,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitPath {
    Recovered,
    Loaded,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors::sql::base::error::DbError;

    #[test]
    fn only_failures_settle_in_failed() {
        let failed = Exit::Failed(LoaderError::Retrieval {
            table: "t".into(),
            source: DbError::Unknown("gone".into()),
        });
        assert_eq!(failed.settled(), Settled::Failed);
        assert_eq!(Exit::Loaded.settled(), Settled::Done);
        assert_eq!(Exit::Recovered.settled(), Settled::Done);
        assert_eq!(failed.path(), ExitPath::Failed);
        assert_eq!(LoadState::Restoring(Exit::Loaded).name(), "restoring");
    }
}
