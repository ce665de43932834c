use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, bail, Context, Result};
use matrestore_core::{ContentUpdate, PersistedRecord, RecordId, RecordSummary, UpdatedAt};
use matrestore_storage::RecordStore;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

pub const DEFAULT_TABLE: &str = "session_materials";

/// Record store over an existing SQLite database. The database and table must
/// already exist; this store never creates or migrates schema.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
    table: String,
}

impl SqliteRecordStore {
    pub fn open(db_path: &Path, table: &str) -> Result<Self> {
        validate_table_name(table)?;
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("open sqlite db {}", db_path.display()))?;
        // fail at connect time rather than at the first query
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(1) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |r| r.get(0),
            )
            .with_context(|| format!("probe sqlite db {}", db_path.display()))?;
        if tables == 0 {
            bail!("table {table} does not exist in {}", db_path.display());
        }
        tracing::debug!(db = %db_path.display(), table, "opened record store");
        Ok(Self {
            conn: Mutex::new(conn),
            table: table.to_string(),
        })
    }

    /// Creates the record table if absent. Used to build fixture databases.
    pub fn create_table(db_path: &Path, table: &str) -> Result<()> {
        validate_table_name(table)?;
        let conn = Connection::open(db_path).with_context(|| format!("open sqlite db {}", db_path.display()))?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL DEFAULT '',
                content TEXT NOT NULL DEFAULT '',
                updated_at INTEGER
            );"
        ))?;
        Ok(())
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Fixture seeding; production runs only update existing rows.
    pub fn insert_record(&self, record: &PersistedRecord) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            &format!("INSERT INTO {}(id, title, content, updated_at) VALUES (?1, ?2, ?3, ?4)", self.table),
            params![record.id.get(), record.title, record.content, token_value(record.updated_at.as_ref())],
        )
        .with_context(|| format!("insert record {} into {}", record.id, self.table))?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| anyhow!("sqlite connection lock poisoned"))
    }
}

impl RecordStore for SqliteRecordStore {
    fn fetch_summary(&self, id: RecordId) -> Result<Option<RecordSummary>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT id, title, COALESCE(LENGTH(content), 0), updated_at FROM {} WHERE id = ?1",
            self.table
        );
        let summary = conn
            .query_row(&sql, params![id.get()], |r| {
                Ok(RecordSummary {
                    id: RecordId(r.get(0)?),
                    title: r.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    content_length: r.get(2)?,
                    updated_at: updated_at_from(r.get_ref(3)?)?,
                })
            })
            .optional()
            .with_context(|| format!("select record {id} from {}", self.table))?;
        Ok(summary)
    }

    fn apply_update(&self, id: RecordId, update: &ContentUpdate, expected: Option<&RecordSummary>) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        // Keep the column's existing shape: text timestamps stay text (UTC).
        let set = format!(
            "UPDATE {} SET content = ?1, title = ?2,
                 updated_at = CASE WHEN typeof(updated_at) = 'text' THEN datetime(?3, 'unixepoch') ELSE ?3 END
             WHERE id = ?4",
            self.table
        );
        let rows = match expected {
            Some(token) => tx.execute(
                &format!("{set} AND COALESCE(LENGTH(content), 0) = ?5 AND updated_at IS ?6"),
                params![
                    update.content,
                    update.title,
                    update.updated_at_unix,
                    id.get(),
                    token.content_length,
                    token_value(token.updated_at.as_ref())
                ],
            ),
            None => tx.execute(&set, params![update.content, update.title, update.updated_at_unix, id.get()]),
        }
        .with_context(|| format!("update record {id} in {}", self.table))?;
        tx.commit()?;
        Ok(rows)
    }
}

/// The token is compared back with `IS`, so it must round-trip unchanged.
fn updated_at_from(value: ValueRef<'_>) -> rusqlite::Result<Option<UpdatedAt>> {
    match value {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(secs) => Ok(Some(UpdatedAt::Unix(secs))),
        ValueRef::Text(bytes) => Ok(Some(UpdatedAt::Text(String::from_utf8_lossy(bytes).into_owned()))),
        ValueRef::Real(_) | ValueRef::Blob(_) => {
            Err(rusqlite::Error::InvalidColumnType(3, "updated_at".into(), value.data_type()))
        }
    }
}

fn token_value(updated_at: Option<&UpdatedAt>) -> Value {
    match updated_at {
        None => Value::Null,
        Some(UpdatedAt::Unix(secs)) => Value::Integer(*secs),
        Some(UpdatedAt::Text(s)) => Value::Text(s.clone()),
    }
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
pub fn validate_table_name(table: &str) -> Result<()> {
    let mut chars = table.chars();
    let Some(first) = chars.next() else {
        bail!("table name is empty");
    };
    if !(first.is_ascii_alphabetic() || first == '_') || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!("table name {table:?} is not a plain SQL identifier");
    }
    Ok(())
}
