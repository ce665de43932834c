use std::path::{Path, PathBuf};

use anyhow::Result;
use matrestore_artifacts::{content_digest, ArtifactStore, FsArtifactStore, RestoreManifest};
use matrestore_core::{RecordSummary, RecoveryError, RunId};
use matrestore_snapshots::{CandidateSelector, FsSnapshotStore, Selected};
use matrestore_storage::RecordStore;
use matrestore_storage_sqlite::SqliteRecordStore;
use matrestore_validate::ContentSignals;

use crate::{restore::RestoreReport, restore::Restorer, Config, EnvCredentials};

/// A selected candidate with its advisory signals. The signals are computed
/// after selection and never feed back into it.
#[derive(Clone, Debug)]
pub struct Scan {
    pub selected: Selected,
    pub signals: ContentSignals,
}

pub struct Runner {
    pub root: PathBuf,
    pub cfg: Config,
    pub snapshots: FsSnapshotStore,
    pub artifacts: Option<FsArtifactStore>,
}

impl Runner {
    pub fn open(root: PathBuf, cfg: Config) -> Result<Self, RecoveryError> {
        cfg.validate()?;
        let snapshots = FsSnapshotStore::new(cfg.snapshot_dir(&root))
            .with_pattern(cfg.snapshots.prefix.clone(), cfg.snapshots.extension.clone());
        let artifacts = cfg
            .reports
            .enabled
            .then(|| FsArtifactStore::new(cfg.reports_root(&root)));
        Ok(Self {
            root,
            cfg,
            snapshots,
            artifacts,
        })
    }

    /// Writes the default config under `root` unless one exists.
    pub fn init_root(root: &Path) -> Result<PathBuf> {
        let cfg_path = Config::config_path(root);
        if !cfg_path.exists() {
            Config::default().save_to(&cfg_path)?;
        }
        Ok(cfg_path)
    }

    pub fn scan(&self) -> Result<Scan, RecoveryError> {
        let selector = CandidateSelector::new(self.cfg.thresholds.min_candidate_chars);
        let selected = selector.select(&self.snapshots)?;
        let signals = matrestore_validate::inspect(&selected.candidate.content);
        Ok(Scan { selected, signals })
    }

    pub fn credentials(&self) -> Result<EnvCredentials, RecoveryError> {
        EnvCredentials::load(&self.cfg.env_file(&self.root)).map_err(|e| RecoveryError::Config(format!("{e:#}")))
    }

    pub fn connect(&self, creds: &EnvCredentials) -> Result<SqliteRecordStore, RecoveryError> {
        let db_path = creds.database_path(&self.root);
        tracing::info!(
            host = %creds.host,
            user = %creds.username,
            db = %db_path.display(),
            table = %self.cfg.target.table,
            "connecting to record store"
        );
        SqliteRecordStore::open(&db_path, &self.cfg.target.table).map_err(RecoveryError::StoreConnection)
    }

    pub fn inspect<S: RecordStore + ?Sized>(&self, store: &S) -> Result<Option<RecordSummary>, RecoveryError> {
        store
            .fetch_summary(self.cfg.record_id())
            .map_err(|e| RecoveryError::store(matrestore_core::RestorePhase::FetchingBefore, e))
    }

    /// Restore the scanned candidate into `store` and record the audit trail.
    pub fn restore_with<S: RecordStore + ?Sized>(
        &self,
        scan: &Scan,
        store: &S,
        run_id: &RunId,
        now_unix: i64,
    ) -> Result<RestoreReport, RecoveryError> {
        let record_id = self.cfg.record_id();
        let span = tracing::info_span!("restore", run_id = %run_id, record_id = %record_id);
        let _guard = span.enter();

        let candidate = &scan.selected.candidate;
        tracing::info!(snapshot = %candidate.source, length = candidate.content_length(), "restoring candidate");
        let report = Restorer::new(store, record_id, self.cfg.thresholds).restore(candidate, now_unix)?;

        if let Some(artifacts) = &self.artifacts {
            if let Err(e) = self.write_audit(artifacts, scan, &report, run_id, now_unix) {
                tracing::warn!(error = %format!("{e:#}"), "could not write restore audit trail");
            }
        }
        Ok(report)
    }

    fn write_audit(
        &self,
        artifacts: &dyn ArtifactStore,
        scan: &Scan,
        report: &RestoreReport,
        run_id: &RunId,
        now_unix: i64,
    ) -> Result<PathBuf> {
        let candidate = &scan.selected.candidate;
        let run_dir = artifacts.create_run_dir(report.record_id, run_id)?;
        artifacts.append_worklog(&run_dir, &format!("## Restore run {} for record {}", run_id, report.record_id))?;
        artifacts.append_worklog(&run_dir, &format!("- selected {} ({} chars)", candidate.source, candidate.content_length()))?;
        if let Some(before) = &report.before {
            artifacts.append_worklog(&run_dir, &format!("- before: {} chars", before.content_length))?;
        }
        artifacts.append_worklog(&run_dir, &format!("- rows affected: {}", report.rows_affected))?;
        if let Some(after) = &report.after {
            artifacts.append_worklog(&run_dir, &format!("- after: {} chars", after.content_length))?;
        }
        artifacts.append_worklog(&run_dir, &format!("- outcome: {}", report.outcome))?;

        let manifest = RestoreManifest {
            run_id: run_id.as_str().to_string(),
            record_id: report.record_id.get(),
            table: self.cfg.target.table.clone(),
            started_at_unix: now_unix,
            source_snapshot: candidate.source.as_str().to_string(),
            title: candidate.title.clone(),
            candidate_length: candidate.content_length(),
            candidate_sha256: content_digest(&candidate.content),
            signals: scan.signals,
            scanned: scan.selected.scanned.clone(),
            before: report.before.clone(),
            rows_affected: report.rows_affected,
            after: report.after.clone(),
            delta: report.delta,
            outcome: report.outcome,
        };
        let path = artifacts.write_manifest(&run_dir, &manifest)?;
        tracing::info!(path = %path.display(), "wrote restore manifest");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrestore_core::{Classification, PersistedRecord, RecordId, RestoreOutcome, ScanVerdict, SkipReason, UpdatedAt};
    use matrestore_storage::InMemoryRecordStore;
    use tempfile::tempdir;

    fn setup(lengths: &[(&str, usize)]) -> (tempfile::TempDir, Runner) {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("storage/logs");
        std::fs::create_dir_all(&logs).unwrap();
        for (stamp, len) in lengths {
            let body = serde_json::json!({
                "title": "Unit 7",
                "content": format!("<h2>PART A</h2><table></table>{}", "v".repeat(*len - 30)),
            });
            std::fs::write(logs.join(format!("material_debug_{stamp}.json")), body.to_string()).unwrap();
        }
        let mut cfg = Config::default();
        cfg.reports.root = dir.path().join("reports").display().to_string();
        let runner = Runner::open(dir.path().to_path_buf(), cfg).unwrap();
        (dir, runner)
    }

    fn truncated() -> PersistedRecord {
        PersistedRecord {
            id: RecordId(2),
            title: "Unit 7".into(),
            content: "x".repeat(200),
            updated_at: Some(UpdatedAt::Unix(1_700_000_000)),
        }
    }

    #[test]
    fn scan_reports_signals_for_selected_candidate() {
        let (_dir, runner) = setup(&[("20240102", 1_200), ("20240101", 16_000)]);
        let scan = runner.scan().unwrap();
        assert_eq!(scan.selected.candidate.source.as_str(), "material_debug_20240101.json");
        assert!(scan.signals.vocabulary);
        assert!(scan.signals.table);
        assert!(!scan.signals.answer_key);
    }

    #[test]
    fn restore_writes_audit_manifest() {
        let (dir, runner) = setup(&[("20240101", 16_000)]);
        let store = InMemoryRecordStore::with_record(truncated());
        let scan = runner.scan().unwrap();
        let run_id = RunId::from_str("run-1");
        let report = runner.restore_with(&scan, &store, &run_id, 1_800_000_000).unwrap();
        assert_eq!(report.outcome, RestoreOutcome::Classified(Classification::Success));

        let manifest_path = dir.path().join("reports/2/run-1/restore_manifest.json");
        let json: serde_json::Value = serde_json::from_slice(&std::fs::read(manifest_path).unwrap()).unwrap();
        assert_eq!(json["source_snapshot"], "material_debug_20240101.json");
        assert_eq!(json["delta"], 15_800);
        assert_eq!(json["candidate_length"], 16_000);
        assert!(dir.path().join("reports/2/run-1/worklog.md").exists());
    }

    #[test]
    fn no_valid_candidate_reports_every_skip() {
        let (_dir, runner) = setup(&[("20240102", 1_200), ("20240101", 4_000)]);
        let scanned = match runner.scan().unwrap_err() {
            RecoveryError::NoValidCandidate { scanned } => scanned,
            other => panic!("unexpected error: {other}"),
        };
        assert_eq!(scanned.len(), 2);
        assert!(scanned.iter().all(|e| matches!(
            e.verdict,
            ScanVerdict::Skipped {
                reason: SkipReason::ContentTooShort { .. }
            }
        )));
    }

    #[test]
    fn disabled_reports_write_nothing() {
        let (dir, mut runner) = setup(&[("20240101", 16_000)]);
        runner.artifacts = None;
        let store = InMemoryRecordStore::with_record(truncated());
        let scan = runner.scan().unwrap();
        runner.restore_with(&scan, &store, &RunId::new(), 1).unwrap();
        assert!(!dir.path().join("reports").exists());
    }

    #[test]
    fn connect_fails_without_database() {
        let (_dir, runner) = setup(&[]);
        let creds = runner.credentials().unwrap();
        let err = runner.connect(&creds).err().unwrap();
        assert!(matches!(err, RecoveryError::StoreConnection(_)));
    }

    #[test]
    fn init_root_writes_default_config_once() {
        let dir = tempdir().unwrap();
        let path = Runner::init_root(dir.path()).unwrap();
        std::fs::write(&path, "[target]\nrecord_id = 5\n").unwrap();
        Runner::init_root(dir.path()).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().target.record_id, 5);
    }
}
