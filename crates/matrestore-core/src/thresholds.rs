use serde::{Deserialize, Serialize};

use crate::{error::RecoveryError, model::Classification};

/// Snapshots shorter than this are assumed to be truncated captures.
pub const DEFAULT_MIN_CANDIDATE_CHARS: usize = 5_000;
/// A restored record must be longer than this to count as complete.
pub const DEFAULT_SUCCESS_CHARS: usize = 15_000;

/// Empirical length gates. Both are tuned to one document template, so they are
/// configuration rather than constants.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Thresholds {
    pub min_candidate_chars: usize,
    pub success_chars: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_candidate_chars: DEFAULT_MIN_CANDIDATE_CHARS,
            success_chars: DEFAULT_SUCCESS_CHARS,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), RecoveryError> {
        if self.min_candidate_chars == 0 {
            return Err(RecoveryError::Config("min_candidate_chars must be greater than 0".into()));
        }
        if self.success_chars < self.min_candidate_chars {
            return Err(RecoveryError::Config(format!(
                "success_chars ({}) must be at least min_candidate_chars ({})",
                self.success_chars, self.min_candidate_chars
            )));
        }
        Ok(())
    }

    pub fn accepts_candidate(&self, length: usize) -> bool {
        length >= self.min_candidate_chars
    }

    /// Strictly greater than `success_chars` is a full restore.
    pub fn classify(&self, restored_length: i64) -> Classification {
        let gate = i64::try_from(self.success_chars).unwrap_or(i64::MAX);
        if restored_length > gate {
            Classification::Success
        } else {
            Classification::PartialSuccess
        }
    }
}
