use matrestore_core::{select_candidate, Candidate, RecoveryError, ScanEntry, ScanVerdict, SnapshotPayload};

use crate::store::SnapshotSource;

/// The snapshot chosen for restoration plus what was examined on the way.
#[derive(Clone, Debug)]
pub struct Selected {
    pub candidate: Candidate,
    pub scanned: Vec<ScanEntry>,
    pub discovered: usize,
}

#[derive(Clone, Copy, Debug)]
pub struct CandidateSelector {
    min_candidate_chars: usize,
}

impl CandidateSelector {
    pub fn new(min_candidate_chars: usize) -> Self {
        Self { min_candidate_chars }
    }

    /// Newest-first scan; the first snapshot that parses, has content, and
    /// clears the length floor wins. Older snapshots are not read.
    pub fn select(&self, source: &dyn SnapshotSource) -> Result<Selected, RecoveryError> {
        let ids = source.list().map_err(|e| RecoveryError::Discovery {
            dir: source.location().to_path_buf(),
            source: e,
        })?;
        if ids.is_empty() {
            return Err(RecoveryError::NoSnapshotsFound {
                dir: source.location().to_path_buf(),
            });
        }
        let discovered = ids.len();
        tracing::info!(count = discovered, dir = %source.location().display(), "found snapshot files");

        let payloads = ids.into_iter().map(|id| {
            tracing::debug!(snapshot = %id, "checking snapshot");
            let bytes = source.read(&id).map_err(|e| e.to_string());
            SnapshotPayload { id, bytes }
        });
        let selection = select_candidate(payloads, self.min_candidate_chars);

        for entry in &selection.scanned {
            match &entry.verdict {
                ScanVerdict::Accepted { length } => {
                    tracing::info!(snapshot = %entry.snapshot, bytes = entry.bytes, length, "valid content found")
                }
                ScanVerdict::Skipped { reason } => {
                    tracing::warn!(snapshot = %entry.snapshot, bytes = entry.bytes, %reason, "skipping snapshot")
                }
            }
        }

        match selection.candidate {
            Some(candidate) => Ok(Selected {
                candidate,
                scanned: selection.scanned,
                discovered,
            }),
            None => Err(RecoveryError::NoValidCandidate {
                scanned: selection.scanned,
            }),
        }
    }
}
