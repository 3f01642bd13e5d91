use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for a [`Database`](crate::Database).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Snapshot file location. `None` keeps everything in memory.
    pub path: Option<PathBuf>,
    /// Whether to `fsync` the snapshot before publishing a commit.
    pub sync_on_commit: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            sync_on_commit: true,
        }
    }
}

impl StoreConfig {
    /// A purely in-memory configuration.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Persist snapshots to `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Returns `true` if commits are written to disk.
    pub fn is_persistent(&self) -> bool {
        self.path.is_some()
    }
}
