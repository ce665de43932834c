use anyhow::anyhow;
use matrestore_core::{
    Candidate, Classification, ContentUpdate, RecordId, RecordSummary, RecoveryError, RestoreOutcome, RestorePhase,
    Thresholds,
};
use matrestore_storage::RecordStore;

/// Before/after comparison for one restore.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestoreReport {
    pub record_id: RecordId,
    pub before: Option<RecordSummary>,
    pub rows_affected: usize,
    pub after: Option<RecordSummary>,
    /// `after - before` in characters; an absent prior record counts as 0.
    pub delta: Option<i64>,
    pub outcome: RestoreOutcome,
}

impl RestoreReport {
    fn not_found(record_id: RecordId, before: Option<RecordSummary>) -> Self {
        Self {
            record_id,
            before,
            rows_affected: 0,
            after: None,
            delta: None,
            outcome: RestoreOutcome::RecordNotFound,
        }
    }
}

/// Applies a selected candidate to the target record:
/// fetch before, one guarded write, fetch after, classify.
pub struct Restorer<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    record_id: RecordId,
    thresholds: Thresholds,
}

impl<'a, S: RecordStore + ?Sized> Restorer<'a, S> {
    pub fn new(store: &'a S, record_id: RecordId, thresholds: Thresholds) -> Self {
        Self {
            store,
            record_id,
            thresholds,
        }
    }

    pub fn restore(&self, candidate: &Candidate, now_unix: i64) -> Result<RestoreReport, RecoveryError> {
        let id = self.record_id;
        enter(RestorePhase::Start);

        enter(RestorePhase::FetchingBefore);
        let before = self
            .store
            .fetch_summary(id)
            .map_err(|e| RecoveryError::store(RestorePhase::FetchingBefore, e))?;
        match &before {
            Some(b) => tracing::info!(title = %b.title, length = b.content_length, "current record"),
            None => tracing::warn!(record_id = %id, "target record not present before write"),
        }

        // The token only guards when there is something to guard.
        enter(RestorePhase::Writing);
        let update = ContentUpdate::from_candidate(candidate, now_unix);
        let rows = self
            .store
            .apply_update(id, &update, before.as_ref())
            .map_err(|e| RecoveryError::store(RestorePhase::Writing, e))?;
        tracing::info!(rows, "update applied");

        if rows == 0 {
            if before.is_none() {
                tracing::warn!(record_id = %id, "update matched no rows");
                return Ok(RestoreReport::not_found(id, before));
            }
            // Present before, unmatched now: deleted or changed underneath us.
            let current = self
                .store
                .fetch_summary(id)
                .map_err(|e| RecoveryError::store(RestorePhase::FetchingAfter, e))?;
            return match current {
                None => {
                    tracing::warn!(record_id = %id, "record disappeared before the write");
                    Ok(RestoreReport::not_found(id, before))
                }
                Some(_) => Err(RecoveryError::ConcurrentModification(id)),
            };
        }

        enter(RestorePhase::FetchingAfter);
        let after = self
            .store
            .fetch_summary(id)
            .map_err(|e| RecoveryError::store(RestorePhase::FetchingAfter, e))?
            .ok_or_else(|| {
                RecoveryError::store(RestorePhase::FetchingAfter, anyhow!("record {id} missing right after a successful write"))
            })?;

        let old_length = before.as_ref().map_or(0, |b| b.content_length);
        let delta = after.content_length - old_length;

        enter(RestorePhase::Classified);
        let classification = self.thresholds.classify(after.content_length);
        match classification {
            Classification::Success => tracing::info!(length = after.content_length, delta, "content restored"),
            Classification::PartialSuccess => tracing::warn!(
                length = after.content_length,
                expected_over = self.thresholds.success_chars,
                delta,
                "restored content is shorter than expected"
            ),
        }

        Ok(RestoreReport {
            record_id: id,
            before,
            rows_affected: rows,
            after: Some(after),
            delta: Some(delta),
            outcome: RestoreOutcome::Classified(classification),
        })
    }
}

fn enter(phase: RestorePhase) {
    tracing::debug!(?phase, "restore phase");
}
