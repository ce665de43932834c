use std::path::PathBuf;

use thiserror::Error;

use crate::{RecordId, RestorePhase, ScanEntry};

/// Run-level failures. Every variant ends the run; nothing is retried.
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("no snapshot files found in {}", .dir.display())]
    NoSnapshotsFound { dir: PathBuf },

    /// Discovery itself failed. A missing directory is not this; it lists as empty.
    #[error("could not list snapshot files in {}", .dir.display())]
    Discovery { dir: PathBuf, source: anyhow::Error },

    /// Carries every examined snapshot with its skip reason.
    #[error("could not find valid content in any of {} snapshot file(s)", .scanned.len())]
    NoValidCandidate { scanned: Vec<ScanEntry> },

    #[error("could not connect to record store: {0:#}")]
    StoreConnection(anyhow::Error),

    #[error("record {0} not found")]
    RecordNotFound(RecordId),

    #[error("record {0} was modified by another writer after it was read; nothing was written")]
    ConcurrentModification(RecordId),

    #[error("record store error while {phase}")]
    Store { phase: RestorePhase, source: anyhow::Error },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RecoveryError {
    pub fn store(phase: RestorePhase, source: anyhow::Error) -> Self {
        RecoveryError::Store { phase, source }
    }
}
