//! Human-readable console report. Not a machine contract, but every fact an
//! operator needs to trust a restore shows up here.

use std::io::{self, Write};

use matrestore_core::{Classification, RecordSummary, RestoreOutcome, ScanEntry, ScanVerdict, Thresholds};

use crate::{restore::RestoreReport, runner::Scan, util::group_thousands};

pub const PREVIEW_CHARS: usize = 200;

pub fn preview(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

/// One block per examined snapshot. Also printed when nothing qualified, so
/// every skip reason reaches the operator.
pub fn write_entries(out: &mut dyn Write, discovered: usize, scanned: &[ScanEntry]) -> io::Result<()> {
    writeln!(out, "Found {discovered} snapshot file(s)")?;
    for entry in scanned {
        writeln!(out, "Checking: {}", entry.snapshot)?;
        writeln!(out, "  File size: {} bytes", group_thousands(entry.bytes as i64))?;
        match &entry.verdict {
            ScanVerdict::Accepted { length } => {
                writeln!(out, "  Valid content found, length: {} chars", group_thousands(*length as i64))?
            }
            ScanVerdict::Skipped { reason } => writeln!(out, "  Skipped: {reason}")?,
        }
    }
    Ok(())
}

pub fn write_scan(out: &mut dyn Write, scan: &Scan) -> io::Result<()> {
    let selected = &scan.selected;
    write_entries(out, selected.discovered, &selected.scanned)?;

    let c = &selected.candidate;
    writeln!(out)?;
    writeln!(out, "=== SELECTED FILE ===")?;
    writeln!(out, "File: {}", c.source)?;
    writeln!(out)?;
    writeln!(out, "=== EXTRACTED DATA ===")?;
    writeln!(out, "Title: {}", c.title)?;
    writeln!(out, "Content length: {} chars", group_thousands(c.content_length() as i64))?;
    writeln!(out, "Content preview (first {PREVIEW_CHARS} chars):")?;
    writeln!(out, "{}...", preview(&c.content, PREVIEW_CHARS))?;
    writeln!(out)?;
    writeln!(out, "Content verification:")?;
    for (signal, present) in scan.signals.iter() {
        let mark = if present { "[x]" } else { "[ ]" };
        writeln!(out, "{mark} Has {}", signal.label())?;
    }
    for warning in scan.signals.warnings() {
        writeln!(out, "WARNING: {warning}")?;
    }
    Ok(())
}

pub fn write_summary(out: &mut dyn Write, heading: &str, summary: &RecordSummary) -> io::Result<()> {
    writeln!(out, "=== {heading} ===")?;
    writeln!(out, "ID: {}", summary.id)?;
    writeln!(out, "Title: {}", summary.title)?;
    writeln!(out, "Content length: {} chars", group_thousands(summary.content_length))?;
    if let Some(ts) = &summary.updated_at {
        writeln!(out, "Updated at: {ts}")?;
    }
    Ok(())
}

pub fn write_restore(out: &mut dyn Write, report: &RestoreReport, thresholds: &Thresholds) -> io::Result<()> {
    if let Some(before) = &report.before {
        write_summary(out, "CURRENT DATABASE RECORD", before)?;
        writeln!(out)?;
    }
    writeln!(out, "Rows affected: {}", report.rows_affected)?;
    writeln!(out)?;

    let after = match (&report.outcome, &report.after) {
        (RestoreOutcome::RecordNotFound, _) | (_, None) => {
            writeln!(out, "FAILED: record {} not found; nothing was restored", report.record_id)?;
            return Ok(());
        }
        (_, Some(after)) => after,
    };

    write_summary(out, "AFTER UPDATE", after)?;
    writeln!(out)?;
    if let Some(delta) = report.delta {
        writeln!(out, "Content changed by: {} chars", group_thousands(delta))?;
    }
    writeln!(out)?;

    match report.outcome {
        RestoreOutcome::Classified(Classification::Success) => {
            writeln!(out, "SUCCESS: content restored to full length")?;
        }
        RestoreOutcome::Classified(Classification::PartialSuccess) => {
            writeln!(out, "PARTIAL: content is still shorter than expected")?;
            writeln!(out, "Expected: >{} chars", group_thousands(thresholds.success_chars as i64))?;
            writeln!(out, "Got: {} chars", group_thousands(after.content_length))?;
        }
        RestoreOutcome::RecordNotFound => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrestore_core::{RecordId, SkipReason, SnapshotId, UpdatedAt};

    fn summary(len: i64) -> RecordSummary {
        RecordSummary {
            id: RecordId(2),
            title: "Unit 1".into(),
            content_length: len,
            updated_at: Some(UpdatedAt::Text("2024-03-01 10:15:00".into())),
        }
    }

    fn render(report: &RestoreReport) -> String {
        let mut buf = Vec::new();
        write_restore(&mut buf, report, &Thresholds::default()).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn preview_cuts_on_char_boundary() {
        assert_eq!(preview("h\u{e9}llo", 2), "h\u{e9}");
        assert_eq!(preview("abc", 200), "abc");
    }

    #[test]
    fn success_report_shows_before_after_and_delta() {
        let out = render(&RestoreReport {
            record_id: RecordId(2),
            before: Some(summary(200)),
            rows_affected: 1,
            after: Some(summary(16_000)),
            delta: Some(15_800),
            outcome: RestoreOutcome::Classified(Classification::Success),
        });
        assert!(out.contains("Content length: 200 chars"));
        assert!(out.contains("Content length: 16,000 chars"));
        assert!(out.contains("Content changed by: 15,800 chars"));
        assert!(out.contains("Updated at: 2024-03-01 10:15:00"));
        assert!(out.contains("SUCCESS"));
    }

    #[test]
    fn partial_report_shows_expectation() {
        let out = render(&RestoreReport {
            record_id: RecordId(2),
            before: None,
            rows_affected: 1,
            after: Some(summary(8_000)),
            delta: Some(8_000),
            outcome: RestoreOutcome::Classified(Classification::PartialSuccess),
        });
        assert!(out.contains("Expected: >15,000 chars"));
        assert!(out.contains("Got: 8,000 chars"));
    }

    #[test]
    fn not_found_report_says_so() {
        let out = render(&RestoreReport {
            record_id: RecordId(2),
            before: None,
            rows_affected: 0,
            after: None,
            delta: None,
            outcome: RestoreOutcome::RecordNotFound,
        });
        assert!(out.contains("Rows affected: 0"));
        assert!(out.contains("record 2 not found"));
    }

    #[test]
    fn entries_list_every_skip_reason() {
        let scanned = vec![
            ScanEntry {
                snapshot: SnapshotId::from_str("material_debug_2.json"),
                bytes: 1_234,
                verdict: ScanVerdict::Skipped {
                    reason: SkipReason::ParseError {
                        message: "EOF while parsing".into(),
                    },
                },
            },
            ScanEntry {
                snapshot: SnapshotId::from_str("material_debug_1.json"),
                bytes: 4_100,
                verdict: ScanVerdict::Skipped {
                    reason: SkipReason::ContentTooShort { length: 4_000, min: 5_000 },
                },
            },
        ];
        let mut buf = Vec::new();
        write_entries(&mut buf, 2, &scanned).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("Found 2 snapshot file(s)"));
        assert!(out.contains("File size: 1,234 bytes"));
        assert!(out.contains("Skipped: JSON parse error: EOF while parsing"));
        assert!(out.contains("Skipped: content too short (4000 chars, need 5000)"));
    }
}
