use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use matrestore_core::SnapshotId;

pub const DEFAULT_PREFIX: &str = "material_debug_";
pub const DEFAULT_EXTENSION: &str = "json";

/// Read-only access to captured snapshots.
pub trait SnapshotSource: Send + Sync {
    /// Where the snapshots live, for diagnostics.
    fn location(&self) -> &Path;
    /// Snapshot identities, newest first.
    fn list(&self) -> Result<Vec<SnapshotId>>;
    fn read(&self, id: &SnapshotId) -> std::io::Result<Vec<u8>>;
}

/// A directory of `<prefix><timestamp>.<extension>` files. Timestamps sort
/// lexicographically, so descending file-name order is newest first.
#[derive(Clone, Debug)]
pub struct FsSnapshotStore {
    pub root: PathBuf,
    pub prefix: String,
    pub extension: String,
}

impl FsSnapshotStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            prefix: DEFAULT_PREFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_pattern(mut self, prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    fn matches(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
            && name
                .strip_suffix(&self.extension)
                .is_some_and(|stem| stem.ends_with('.'))
    }
}

impl SnapshotSource for FsSnapshotStore {
    fn location(&self) -> &Path {
        &self.root
    }

    fn list(&self) -> Result<Vec<SnapshotId>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(dir = %self.root.display(), "snapshot directory does not exist");
                return Ok(vec![]);
            }
            Err(e) => return Err(e).with_context(|| format!("list snapshots in {}", self.root.display())),
        };

        let mut names = vec![];
        for entry in entries {
            let entry = entry.with_context(|| format!("list snapshots in {}", self.root.display()))?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if self.matches(&name) && entry.path().is_file() {
                names.push(name);
            }
        }
        names.sort_unstable_by(|a, b| b.cmp(a));
        Ok(names.into_iter().map(SnapshotId::from_str).collect())
    }

    fn read(&self, id: &SnapshotId) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.root.join(id.as_str()))
    }
}
