//! SQLite-backed cookie jar
//!
//! Records live in a single `cookies` table keyed by
//! (name, domain, path, partition_key). The partition key is stored as its
//! JSON text, or an empty string for unpartitioned records.

use crate::error::{CookieKitError, Result};
use crate::jar::{is_addressed, prepare_write, CookieJar, JarQuery};
use crate::record::{CookieRecord, SameSite};
use rusqlite::{params, Connection, Row};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use url::Url;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS cookies (
    name TEXT NOT NULL,
    value TEXT NOT NULL,
    domain TEXT NOT NULL,
    path TEXT NOT NULL,
    secure INTEGER NOT NULL DEFAULT 0,
    http_only INTEGER NOT NULL DEFAULT 0,
    same_site TEXT NOT NULL DEFAULT 'unspecified',
    expiration_date REAL,
    store_id TEXT,
    partition_key TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (name, domain, path, partition_key)
)";

const COLUMNS: &str = "name, value, domain, path, secure, http_only, same_site, \
                       expiration_date, store_id, partition_key";

/// Persistent cookie jar stored in an SQLite file
pub struct SqliteJar {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteJar {
    /// Open (or create) the jar file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(|e| {
            CookieKitError::Jar(format!("Failed to open cookie jar {:?}: {}", path, e))
        })?;
        Self::init(conn, Some(path.to_path_buf()))
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CookieKitError::Jar(format!("Failed to open cookie jar: {}", e)))?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute(SCHEMA, [])
            .map_err(|e| CookieKitError::Jar(format!("Failed to create cookie table: {}", e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CookieKitError::Jar("Cookie jar lock poisoned".to_string()))
    }

    fn query_records(&self, query: &JarQuery) -> Result<Vec<CookieRecord>> {
        let conn = self.lock()?;
        let sql = match query.domain {
            Some(_) => format!(
                "SELECT {} FROM cookies WHERE domain = ?1 ORDER BY domain, name, path",
                COLUMNS
            ),
            None => format!("SELECT {} FROM cookies ORDER BY domain, name, path", COLUMNS),
        };
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| CookieKitError::Jar(format!("Failed to prepare cookie query: {}", e)))?;
        let mut rows = match &query.domain {
            Some(domain) => stmt.query([domain]),
            None => stmt.query([]),
        }
        .map_err(|e| CookieKitError::Jar(format!("Failed to query cookies: {}", e)))?;

        let mut records = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| CookieKitError::Jar(format!("Failed to read cookie row: {}", e)))?
        {
            records.push(row_to_record(row)?);
        }
        Ok(records)
    }

    fn upsert(&self, record: &CookieRecord) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO cookies ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                COLUMNS
            ),
            params![
                record.name,
                record.value,
                record.domain,
                record.path,
                record.secure,
                record.http_only,
                record.same_site.as_str(),
                record.expiration_date,
                record.store_id,
                partition_column(record.partition_key.as_ref()),
            ],
        )
        .map_err(|e| CookieKitError::Jar(format!("Failed to write cookie '{}': {}", record.name, e)))?;
        Ok(())
    }

    fn delete(&self, url: &Url, name: &str, partition_key: Option<&Value>) -> Result<usize> {
        let conn = self.lock()?;
        let partition = partition_column(partition_key);

        // Stored domains and paths are raw; match them in Rust against the
        // normalized URL, then delete by primary key.
        let targets = {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM cookies WHERE name = ?1 AND partition_key = ?2",
                    COLUMNS
                ))
                .map_err(|e| CookieKitError::Jar(format!("Failed to prepare cookie query: {}", e)))?;
            let mut rows = stmt
                .query(params![name, partition])
                .map_err(|e| CookieKitError::Jar(format!("Failed to query cookies: {}", e)))?;

            let mut targets = Vec::new();
            while let Some(row) = rows
                .next()
                .map_err(|e| CookieKitError::Jar(format!("Failed to read cookie row: {}", e)))?
            {
                let record = row_to_record(row)?;
                if is_addressed(&record, url, name, partition_key) {
                    targets.push(record);
                }
            }
            targets
        };

        let mut removed = 0;
        for record in &targets {
            removed += conn
                .execute(
                    "DELETE FROM cookies
                     WHERE name = ?1 AND domain = ?2 AND path = ?3 AND partition_key = ?4",
                    params![record.name, record.domain, record.path, partition],
                )
                .map_err(|e| {
                    CookieKitError::Jar(format!("Failed to remove cookie '{}': {}", name, e))
                })?;
        }
        Ok(removed)
    }
}

fn partition_column(partition_key: Option<&Value>) -> String {
    partition_key.map(Value::to_string).unwrap_or_default()
}

fn row_to_record(row: &Row<'_>) -> Result<CookieRecord> {
    let read_err = |e: rusqlite::Error| CookieKitError::Jar(format!("Failed to read cookie row: {}", e));

    let same_site: String = row.get(6).map_err(read_err)?;
    let partition: String = row.get(9).map_err(read_err)?;
    let partition_key = if partition.is_empty() {
        None
    } else {
        Some(serde_json::from_str(&partition)?)
    };

    Ok(CookieRecord {
        name: row.get(0).map_err(read_err)?,
        value: row.get(1).map_err(read_err)?,
        domain: row.get(2).map_err(read_err)?,
        path: row.get(3).map_err(read_err)?,
        secure: row.get(4).map_err(read_err)?,
        http_only: row.get(5).map_err(read_err)?,
        same_site: same_site.parse().unwrap_or(SameSite::Unspecified),
        expiration_date: row.get(7).map_err(read_err)?,
        store_id: row.get(8).map_err(read_err)?,
        partition_key,
    })
}

impl CookieJar for SqliteJar {
    async fn list(&self, query: &JarQuery) -> Result<Vec<CookieRecord>> {
        self.query_records(query)
    }

    async fn set(&self, record: &CookieRecord, url: &Url) -> Result<()> {
        let stored = prepare_write(record, url)?;
        log::debug!("sqlite jar: set {} for {}", stored.name, url);
        self.upsert(&stored)
    }

    async fn remove(&self, url: &Url, name: &str, partition_key: Option<&Value>) -> Result<()> {
        let removed = self.delete(url, name, partition_key)?;
        log::debug!("sqlite jar: removed {} row(s) for {} at {}", removed, name, url);
        Ok(())
    }
}
