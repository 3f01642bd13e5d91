//! CLI configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use eltree_store::StoreConfig;
use serde::{Deserialize, Serialize};

/// Store file used when neither `--db` nor the config file names one.
pub const DEFAULT_DB: &str = "eltree.db";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub store: StoreConfig,
}

impl CliConfig {
    /// Read `path` if given, otherwise start from defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve the store settings, letting `db` override the file.
    pub fn store_config(&self, db: Option<PathBuf>) -> StoreConfig {
        let mut store = self.store.clone();
        if let Some(db) = db {
            store.path = Some(db);
        }
        if store.path.is_none() {
            store.path = Some(PathBuf::from(DEFAULT_DB));
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let config = CliConfig::load(None).unwrap();
        assert_eq!(config, CliConfig::default());
        let store = config.store_config(None);
        assert_eq!(store.path, Some(PathBuf::from(DEFAULT_DB)));
        assert!(store.sync_on_commit);
    }

    #[test]
    fn reads_store_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eltree.toml");
        fs::write(&path, "[store]\npath = \"docs.db\"\nsync_on_commit = false\n").unwrap();

        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config.store.path, Some(PathBuf::from("docs.db")));
        assert!(!config.store.sync_on_commit);
    }

    #[test]
    fn db_flag_overrides_file() {
        let config: CliConfig = toml::from_str("[store]\npath = \"docs.db\"\n").unwrap();
        let store = config.store_config(Some(PathBuf::from("other.db")));
        assert_eq!(store.path, Some(PathBuf::from("other.db")));
    }

    #[test]
    fn empty_file_is_default() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CliConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("reading config"));
    }
}
