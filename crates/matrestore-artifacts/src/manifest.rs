use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use matrestore_core::{RecordSummary, RestoreOutcome, ScanEntry};
use matrestore_validate::ContentSignals;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RestoreManifest {
    pub run_id: String,
    pub record_id: i64,
    pub table: String,
    pub started_at_unix: i64,
    pub source_snapshot: String,
    pub title: String,
    pub candidate_length: usize,
    pub candidate_sha256: String,
    pub signals: ContentSignals,
    pub scanned: Vec<ScanEntry>,
    pub before: Option<RecordSummary>,
    pub rows_affected: usize,
    pub after: Option<RecordSummary>,
    pub delta: Option<i64>,
    pub outcome: RestoreOutcome,
}

/// Hex SHA-256 of the restored content, so a later audit can tell whether two
/// runs wrote the same bytes.
pub fn content_digest(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
