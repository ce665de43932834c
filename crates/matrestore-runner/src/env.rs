use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::resolve_path;

/// Store connection parameters read from a `KEY=value` env file.
///
/// Only `DB_HOST`, `DB_DATABASE`, `DB_USERNAME` and `DB_PASSWORD` are
/// recognised; every other line is ignored. The SQLite backend uses
/// `database` as the database file path.
#[derive(Clone, PartialEq, Eq)]
pub struct EnvCredentials {
    pub host: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            database: "school_db".to_string(),
            username: "root".to_string(),
            password: String::new(),
        }
    }
}

impl fmt::Debug for EnvCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvCredentials")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl EnvCredentials {
    pub fn parse(text: &str) -> Self {
        let mut creds = Self::default();
        for line in text.lines() {
            let line = line.trim();
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = unquote(value.trim()).to_string();
            match key.trim() {
                "DB_HOST" => creds.host = value,
                "DB_DATABASE" => creds.database = value,
                "DB_USERNAME" => creds.username = value,
                "DB_PASSWORD" => creds.password = value,
                _ => {}
            }
        }
        creds
    }

    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "env file not found; using default credentials");
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
        }
    }

    pub fn database_path(&self, root: &Path) -> PathBuf {
        resolve_path(root, &self.database)
    }
}

fn unquote(v: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = v.strip_prefix(q).and_then(|s| s.strip_suffix(q)) {
            return inner;
        }
    }
    v
}
