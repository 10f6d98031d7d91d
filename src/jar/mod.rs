//! Cookie jar collaborator
//!
//! The jar is the authoritative store. It can list, set and remove records
//! but has no in-place update; callers that need one go through
//! [`crate::reconcile`]. Records are addressed for writes by a URL plus a
//! name, and jars enforce the write invariants themselves.

use crate::error::{CookieKitError, Result};
use crate::record::{validate_for_write, CookieRecord};
use serde_json::Value;
use std::future::Future;
use url::Url;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryJar;
pub use sqlite::SqliteJar;

/// Selection passed to [`CookieJar::list`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JarQuery {
    /// Exact domain match, not a substring
    pub domain: Option<String>,
}

impl JarQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn domain(domain: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
        }
    }

    pub fn matches(&self, record: &CookieRecord) -> bool {
        self.domain
            .as_deref()
            .map_or(true, |domain| record.domain == domain)
    }
}

/// Async cookie store interface
pub trait CookieJar: Send + Sync {
    fn list(&self, query: &JarQuery) -> impl Future<Output = Result<Vec<CookieRecord>>> + Send;

    /// Create or overwrite the record addressed by `url` and `record.name`.
    fn set(&self, record: &CookieRecord, url: &Url) -> impl Future<Output = Result<()>> + Send;

    /// Delete the addressed record. Removing a record that does not exist
    /// succeeds.
    fn remove(
        &self,
        url: &Url,
        name: &str,
        partition_key: Option<&Value>,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Host-side checks applied by every jar before a write. Returns the record
/// as it will be stored, with domain and path taken from `url` when empty.
pub(crate) fn prepare_write(record: &CookieRecord, url: &Url) -> Result<CookieRecord> {
    validate_for_write(record).map_err(|e| CookieKitError::Jar(e.to_string()))?;
    if record.secure && url.scheme() != "https" {
        return Err(CookieKitError::Jar(format!(
            "Secure cookie '{}' cannot be set from {}",
            record.name, url
        )));
    }

    let mut stored = record.clone();
    if stored.domain.is_empty() {
        stored.domain = url.host_str().unwrap_or_default().to_string();
    }
    if stored.path.is_empty() {
        stored.path = url.path().to_string();
    }
    Ok(stored)
}

/// Whether `record` is the one addressed by a remove call.
///
/// The stored domain and path are compared in the form `url` carries them:
/// percent-encoded path, punycode host.
pub(crate) fn is_addressed(
    record: &CookieRecord,
    url: &Url,
    name: &str,
    partition_key: Option<&Value>,
) -> bool {
    if record.name != name || record.partition_key.as_ref() != partition_key {
        return false;
    }
    match Url::parse(&format!("{}://{}{}", url.scheme(), record.host(), record.path)) {
        Ok(stored) => stored.host_str() == url.host_str() && stored.path() == url.path(),
        Err(_) => false,
    }
}
