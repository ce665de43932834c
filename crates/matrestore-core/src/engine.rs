use serde_json::Value;

use crate::{Candidate, ScanEntry, ScanVerdict, SkipReason, SnapshotId, SnapshotPayload, DEFAULT_TITLE};

/// Content lengths are counted in characters, matching SQL `LENGTH()` on TEXT.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Outcome of scanning snapshots newest-first.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    pub candidate: Option<Candidate>,
    pub scanned: Vec<ScanEntry>,
}

/// Decide whether one snapshot is restorable.
pub fn evaluate_snapshot(id: &SnapshotId, bytes: &[u8], min_chars: usize) -> Result<Candidate, SkipReason> {
    if bytes.is_empty() {
        return Err(SkipReason::EmptyFile);
    }

    let value: Value = serde_json::from_slice(bytes).map_err(|e| SkipReason::ParseError { message: e.to_string() })?;
    let mut fields = match value {
        Value::Object(fields) => fields,
        other => {
            return Err(SkipReason::ParseError {
                message: format!("expected a JSON object, found {}", kind_of(&other)),
            })
        }
    };

    let content = match fields.remove("content") {
        None | Some(Value::Null) => return Err(SkipReason::MissingContentField),
        Some(Value::String(s)) => s,
        Some(other) => {
            return Err(SkipReason::ParseError {
                message: format!("'content' is {}, expected a string", kind_of(&other)),
            })
        }
    };

    let length = char_len(&content);
    if length < min_chars {
        return Err(SkipReason::ContentTooShort { length, min: min_chars });
    }

    let title = match fields.remove("title") {
        Some(Value::String(t)) => t,
        _ => DEFAULT_TITLE.to_string(),
    };

    Ok(Candidate {
        source: id.clone(),
        title,
        content,
    })
}

/// Scan `snapshots` in the order given and stop at the first acceptable one.
///
/// The iterator is consumed lazily: payloads after the accepted snapshot are
/// never pulled, so a reading iterator never touches those files.
pub fn select_candidate<I>(snapshots: I, min_chars: usize) -> Selection
where
    I: IntoIterator<Item = SnapshotPayload>,
{
    let mut scanned = Vec::new();
    for payload in snapshots {
        let (bytes, verdict) = match &payload.bytes {
            Ok(b) => (b.len(), evaluate_snapshot(&payload.id, b, min_chars)),
            Err(message) => (0, Err(SkipReason::Unreadable { message: message.clone() })),
        };
        match verdict {
            Ok(candidate) => {
                scanned.push(ScanEntry {
                    snapshot: payload.id,
                    bytes,
                    verdict: ScanVerdict::Accepted { length: candidate.content_length() },
                });
                return Selection {
                    candidate: Some(candidate),
                    scanned,
                };
            }
            Err(reason) => scanned.push(ScanEntry {
                snapshot: payload.id,
                bytes,
                verdict: ScanVerdict::Skipped { reason },
            }),
        }
    }
    Selection { candidate: None, scanned }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str, json: &str) -> SnapshotPayload {
        SnapshotPayload {
            id: SnapshotId::from_str(name),
            bytes: Ok(json.as_bytes().to_vec()),
        }
    }

    fn doc(title: Option<&str>, len: usize) -> String {
        let mut v = serde_json::json!({ "content": "x".repeat(len) });
        if let Some(t) = title {
            v["title"] = t.into();
        }
        v.to_string()
    }

    #[test]
    fn picks_first_qualifying_not_longest() {
        let snaps = vec![
            payload("c.json", &doc(None, 1_200)),
            payload("b.json", &doc(Some("Unit 4"), 6_000)),
            payload("a.json", &doc(None, 20_000)),
        ];
        let sel = select_candidate(snaps, 5_000);
        let c = sel.candidate.unwrap();
        assert_eq!(c.source.as_str(), "b.json");
        assert_eq!(c.title, "Unit 4");
        assert_eq!(c.content_length(), 6_000);
        // a.json is never examined
        assert_eq!(sel.scanned.len(), 2);
    }

    #[test]
    fn none_when_every_snapshot_is_short() {
        let snaps = vec![payload("b.json", &doc(None, 4_999)), payload("a.json", &doc(None, 10))];
        let sel = select_candidate(snaps, 5_000);
        assert!(sel.candidate.is_none());
        assert_eq!(sel.scanned.len(), 2);
        assert!(sel.scanned.iter().all(|e| matches!(
            e.verdict,
            ScanVerdict::Skipped { reason: SkipReason::ContentTooShort { .. } }
        )));
    }

    #[test]
    fn skips_malformed_and_missing_content() {
        let snaps = vec![
            payload("e.json", "{not json"),
            payload("d.json", "[1, 2]"),
            payload("c.json", r#"{"title": "no body"}"#),
            payload("b.json", r#"{"content": 42}"#),
            payload("a.json", &doc(None, 5_000)),
        ];
        let sel = select_candidate(snaps, 5_000);
        assert_eq!(sel.candidate.unwrap().source.as_str(), "a.json");
        let reasons: Vec<_> = sel
            .scanned
            .iter()
            .filter_map(|e| match &e.verdict {
                ScanVerdict::Skipped { reason } => Some(reason.clone()),
                ScanVerdict::Accepted { .. } => None,
            })
            .collect();
        assert!(matches!(reasons[0], SkipReason::ParseError { .. }));
        assert!(matches!(reasons[1], SkipReason::ParseError { .. }));
        assert_eq!(reasons[2], SkipReason::MissingContentField);
        assert!(matches!(reasons[3], SkipReason::ParseError { .. }));
    }

    #[test]
    fn empty_and_unreadable_files_are_skipped() {
        let snaps = vec![
            payload("c.json", ""),
            SnapshotPayload {
                id: SnapshotId::from_str("b.json"),
                bytes: Err("permission denied".into()),
            },
            payload("a.json", &doc(None, 7_000)),
        ];
        let sel = select_candidate(snaps, 5_000);
        assert_eq!(sel.scanned[0].verdict, ScanVerdict::Skipped { reason: SkipReason::EmptyFile });
        assert!(matches!(
            sel.scanned[1].verdict,
            ScanVerdict::Skipped { reason: SkipReason::Unreadable { .. } }
        ));
        assert!(sel.candidate.is_some());
    }

    #[test]
    fn null_content_counts_as_missing() {
        let r = evaluate_snapshot(&SnapshotId::from_str("a"), br#"{"content": null}"#, 1);
        assert_eq!(r.unwrap_err(), SkipReason::MissingContentField);
    }

    #[test]
    fn title_defaults_to_untitled() {
        let c = evaluate_snapshot(&SnapshotId::from_str("a"), doc(None, 10).as_bytes(), 5).unwrap();
        assert_eq!(c.title, DEFAULT_TITLE);
        let c = evaluate_snapshot(&SnapshotId::from_str("a"), br#"{"content":"hello","title":null}"#, 5).unwrap();
        assert_eq!(c.title, DEFAULT_TITLE);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 3 chars, 9 bytes
        let body = serde_json::json!({ "content": "\u{1eeb}\u{1eeb}\u{1eeb}" }).to_string();
        let c = evaluate_snapshot(&SnapshotId::from_str("a"), body.as_bytes(), 3).unwrap();
        assert_eq!(c.content_length(), 3);
    }

    #[test]
    fn does_not_pull_past_the_accepted_snapshot() {
        let mut pulled = 0;
        let snaps = (0..5).map(|i| {
            pulled += 1;
            payload(&format!("{i}.json"), &doc(None, 5_000))
        });
        let sel = select_candidate(snaps, 5_000);
        assert!(sel.candidate.is_some());
        assert_eq!(pulled, 1);
    }
}
