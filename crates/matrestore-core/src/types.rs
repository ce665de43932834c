use serde::{Deserialize, Serialize};

use crate::{ids::*, model::*};

pub const DEFAULT_TITLE: &str = "Untitled";

/// Raw bytes of one snapshot file, or the reason they could not be read.
#[derive(Clone, Debug)]
pub struct SnapshotPayload {
    pub id: SnapshotId,
    pub bytes: Result<Vec<u8>, String>,
}

/// A snapshot that passed parsing and the length floor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub source: SnapshotId,
    pub title: String,
    pub content: String,
}

impl Candidate {
    pub fn content_length(&self) -> usize {
        crate::engine::char_len(&self.content)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "verdict")]
pub enum ScanVerdict {
    Accepted { length: usize },
    Skipped { reason: SkipReason },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanEntry {
    pub snapshot: SnapshotId,
    pub bytes: usize,
    pub verdict: ScanVerdict,
}

/// Stored `updated_at` exactly as the row holds it. Existing tables may keep
/// unix seconds or a `YYYY-MM-DD HH:MM:SS` string; either is only compared for
/// equality, never parsed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum UpdatedAt {
    Unix(i64),
    Text(String),
}

impl std::fmt::Display for UpdatedAt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdatedAt::Unix(secs) => write!(f, "{secs} (unix)"),
            UpdatedAt::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistedRecord {
    pub id: RecordId,
    pub title: String,
    pub content: String,
    pub updated_at: Option<UpdatedAt>,
}

impl PersistedRecord {
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            id: self.id,
            title: self.title.clone(),
            content_length: crate::engine::char_len(&self.content) as i64,
            updated_at: self.updated_at.clone(),
        }
    }
}

/// Diagnostic projection of a record. `(content_length, updated_at)` doubles
/// as the optimistic concurrency token for the write.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordSummary {
    pub id: RecordId,
    pub title: String,
    pub content_length: i64,
    pub updated_at: Option<UpdatedAt>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentUpdate {
    pub title: String,
    pub content: String,
    pub updated_at_unix: i64,
}

impl ContentUpdate {
    pub fn from_candidate(candidate: &Candidate, now_unix: i64) -> Self {
        Self {
            title: candidate.title.clone(),
            content: candidate.content.clone(),
            updated_at_unix: now_unix,
        }
    }
}
