use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use matrestore_core::{RecordId, RecoveryError, Thresholds};
use matrestore_snapshots::{DEFAULT_EXTENSION, DEFAULT_PREFIX};
use matrestore_storage_sqlite::{validate_table_name, DEFAULT_TABLE};

use crate::util::resolve_path;

pub const CONFIG_FILE: &str = "matrestore.toml";

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub snapshots: SnapshotsConfig,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SnapshotsConfig {
    pub dir: String,
    pub prefix: String,
    pub extension: String,
}

impl Default for SnapshotsConfig {
    fn default() -> Self {
        Self {
            dir: "storage/logs".to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TargetConfig {
    pub table: String,
    pub record_id: i64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            record_id: 2,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub env_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            env_file: ".env".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportsConfig {
    pub enabled: bool,
    pub root: String,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root: "~/.matrestore/reports".to_string(),
        }
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
        Ok(cfg)
    }

    /// Defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let s = toml::to_string_pretty(self).with_context(|| "serialize toml")?;
        std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), RecoveryError> {
        self.thresholds.validate()?;
        validate_table_name(&self.target.table).map_err(|e| RecoveryError::Config(e.to_string()))?;
        if self.snapshots.prefix.is_empty() && self.snapshots.extension.is_empty() {
            return Err(RecoveryError::Config("snapshots.prefix and snapshots.extension cannot both be empty".into()));
        }
        Ok(())
    }

    pub fn record_id(&self) -> RecordId {
        RecordId(self.target.record_id)
    }

    pub fn config_path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }

    pub fn snapshot_dir(&self, root: &Path) -> PathBuf {
        resolve_path(root, &self.snapshots.dir)
    }

    pub fn env_file(&self, root: &Path) -> PathBuf {
        resolve_path(root, &self.store.env_file)
    }

    pub fn reports_root(&self, root: &Path) -> PathBuf {
        resolve_path(root, &self.reports.root)
    }
}
