use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a snapshot was passed over during selection. None of these stop the scan.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SkipReason {
    Unreadable { message: String },
    EmptyFile,
    ParseError { message: String },
    MissingContentField,
    ContentTooShort { length: usize, min: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unreadable { message } => write!(f, "unreadable: {message}"),
            SkipReason::EmptyFile => f.write_str("file is empty"),
            SkipReason::ParseError { message } => write!(f, "JSON parse error: {message}"),
            SkipReason::MissingContentField => f.write_str("no 'content' field found"),
            SkipReason::ContentTooShort { length, min } => {
                write!(f, "content too short ({length} chars, need {min})")
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Success,
    PartialSuccess,
}

/// Terminal result of a restore that reached the write.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RestoreOutcome {
    Classified(Classification),
    RecordNotFound,
}

impl RestoreOutcome {
    /// Success and PartialSuccess both mean the write landed.
    pub fn is_failure(&self) -> bool {
        matches!(self, RestoreOutcome::RecordNotFound)
    }
}

impl fmt::Display for RestoreOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreOutcome::Classified(Classification::Success) => f.write_str("success"),
            RestoreOutcome::Classified(Classification::PartialSuccess) => f.write_str("partial_success"),
            RestoreOutcome::RecordNotFound => f.write_str("record_not_found"),
        }
    }
}

/// Phases of a single restore, in order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RestorePhase {
    Start,
    FetchingBefore,
    Writing,
    FetchingAfter,
    Classified,
}

impl fmt::Display for RestorePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RestorePhase::Start => "starting",
            RestorePhase::FetchingBefore => "fetching the current record",
            RestorePhase::Writing => "writing the restored content",
            RestorePhase::FetchingAfter => "re-fetching the restored record",
            RestorePhase::Classified => "classifying the result",
        };
        f.write_str(s)
    }
}
