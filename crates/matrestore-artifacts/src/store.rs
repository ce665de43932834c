use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use matrestore_core::{RecordId, RunId};

use crate::manifest::RestoreManifest;

pub const MANIFEST_FILE: &str = "restore_manifest.json";
pub const WORKLOG_FILE: &str = "worklog.md";

pub trait ArtifactStore: Send + Sync {
    fn create_run_dir(&self, record_id: RecordId, run_id: &RunId) -> Result<PathBuf>;
    fn write_manifest(&self, run_dir: &Path, manifest: &RestoreManifest) -> Result<PathBuf>;
    fn append_worklog(&self, run_dir: &Path, line: &str) -> Result<()>;
}

/// Lays runs out as `<root>/<record_id>/<run_id>/`.
#[derive(Clone, Debug)]
pub struct FsArtifactStore {
    pub root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl ArtifactStore for FsArtifactStore {
    fn create_run_dir(&self, record_id: RecordId, run_id: &RunId) -> Result<PathBuf> {
        let dir = self.root.join(record_id.to_string()).join(run_id.as_str());
        std::fs::create_dir_all(&dir).with_context(|| format!("create run dir {}", dir.display()))?;
        Ok(dir)
    }

    fn write_manifest(&self, run_dir: &Path, manifest: &RestoreManifest) -> Result<PathBuf> {
        let path = run_dir.join(MANIFEST_FILE);
        let bytes = serde_json::to_vec_pretty(manifest)?;
        std::fs::write(&path, bytes).with_context(|| format!("write manifest {}", path.display()))?;
        Ok(path)
    }

    fn append_worklog(&self, run_dir: &Path, line: &str) -> Result<()> {
        let path = run_dir.join(WORKLOG_FILE);
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open worklog {}", path.display()))?;
        writeln!(f, "{}", line)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrestore_core::{Classification, RestoreOutcome};
    use matrestore_validate::ContentSignals;
    use tempfile::tempdir;

    #[test]
    fn writes_manifest_and_worklog() {
        let dir = tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path().to_path_buf());
        let run_dir = store.create_run_dir(RecordId(2), &RunId::from_str("r")).unwrap();
        assert!(run_dir.ends_with("2/r"));
        store.append_worklog(&run_dir, "- selected a.json").unwrap();
        store.append_worklog(&run_dir, "- wrote 1 row").unwrap();
        let path = store
            .write_manifest(&run_dir, &RestoreManifest {
                run_id: "r".into(),
                record_id: 2,
                table: "session_materials".into(),
                started_at_unix: 0,
                source_snapshot: "a.json".into(),
                title: "t".into(),
                candidate_length: 3,
                candidate_sha256: crate::content_digest("abc"),
                signals: ContentSignals::default(),
                scanned: vec![],
                before: None,
                rows_affected: 1,
                after: None,
                delta: Some(3),
                outcome: RestoreOutcome::Classified(Classification::PartialSuccess),
            })
            .unwrap();

        let worklog = std::fs::read_to_string(run_dir.join(WORKLOG_FILE)).unwrap();
        assert_eq!(worklog.lines().count(), 2);
        let json: serde_json::Value = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(json["outcome"]["classified"], "partial_success");
        assert_eq!(json["rows_affected"], 1);
    }
}
