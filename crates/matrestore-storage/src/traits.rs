use matrestore_core::{ContentUpdate, RecordId, RecordSummary};

pub trait RecordStore: Send + Sync {
    /// `SELECT id, title, LENGTH(content), updated_at ... WHERE id = ?`
    fn fetch_summary(&self, id: RecordId) -> anyhow::Result<Option<RecordSummary>>;

    /// Single-row update of content, title and updated_at. When `expected` is
    /// given the write only applies if the stored length and updated_at still
    /// match it. Returns rows affected.
    fn apply_update(&self, id: RecordId, update: &ContentUpdate, expected: Option<&RecordSummary>) -> anyhow::Result<usize>;
}
