//! Reconciliation of local changes against the cookie jar
//!
//! The jar has no update primitive, so an edit is a remove followed by a
//! set at the same address. Between the two calls the record is absent from
//! the jar; if the set fails there is no rollback and the caller receives
//! [`CookieKitError::RemovedButNotRecreated`].
//!
//! All jar calls are awaited one at a time. Bulk operations never fan out,
//! so records sharing a name across paths or domains cannot race.

use crate::error::{CookieKitError, Result};
use crate::jar::CookieJar;
use crate::record::{validate_for_write, CookieDraft, CookieRecord, ValidationError};
use std::fmt;
use url::Url;

mod session;

pub use session::{CookieManager, CookieSession, ExportPayload};

/// URL the jar uses to address `record`.
///
/// The scheme is `https` iff the record is secure, the host is the domain
/// without its leading dot and the path is appended as-is.
pub fn cookie_url(record: &CookieRecord) -> Result<Url> {
    let scheme = if record.secure { "https" } else { "http" };
    let raw = format!("{}://{}{}", scheme, record.host(), record.path);
    Url::parse(&raw)
        .map_err(|e| CookieKitError::InvalidUrl(format!("Invalid cookie URL '{}': {}", raw, e)))
}

/// Replace `original` in the jar with `draft` applied.
///
/// Validation happens before the jar is touched. Returns the record as it
/// was written.
pub async fn apply_edit<J: CookieJar>(
    jar: &J,
    original: &CookieRecord,
    draft: &CookieDraft,
) -> Result<CookieRecord> {
    let merged = draft.apply_to(original);
    validate_for_write(&merged)?;
    let url = cookie_url(original)?;

    jar.remove(&url, &original.name, original.partition_key.as_ref())
        .await?;

    if let Err(err) = jar.set(&merged, &url).await {
        log::error!(
            "Cookie {} removed from {} but not recreated: {}",
            original.name,
            url,
            err
        );
        return Err(CookieKitError::RemovedButNotRecreated {
            name: original.name.clone(),
            reason: err.to_string(),
        });
    }

    log::debug!("Updated cookie {} at {}", merged.name, url);
    Ok(merged)
}

/// Remove a single record. Confirmation is the caller's job.
pub async fn apply_delete<J: CookieJar>(jar: &J, record: &CookieRecord) -> Result<()> {
    let url = cookie_url(record)?;
    jar.remove(&url, &record.name, record.partition_key.as_ref())
        .await
}

/// Outcome of a bulk delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkDeleteReport {
    pub deleted_count: usize,
    pub failed_count: usize,
}

impl fmt::Display for BulkDeleteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deleted {} cookies", self.deleted_count)?;
        if self.failed_count > 0 {
            write!(f, ", {} failed", self.failed_count)?;
        }
        Ok(())
    }
}

/// Remove every record in `records`, in order.
///
/// A failing removal is logged and counted; the remaining records are
/// still attempted.
pub async fn apply_bulk_delete<J: CookieJar>(
    jar: &J,
    records: &[CookieRecord],
) -> BulkDeleteReport {
    let mut report = BulkDeleteReport::default();
    for record in records {
        match apply_delete(jar, record).await {
            Ok(()) => report.deleted_count += 1,
            Err(err) => {
                log::warn!(
                    "Failed to delete cookie {} from {}: {}",
                    record.name,
                    record.domain,
                    err
                );
                report.failed_count += 1;
            }
        }
    }
    log::info!("{}", report);
    report
}

/// Outcome of a bulk import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportReport {
    pub imported_count: usize,
    pub failed_count: usize,
    /// Netscape lines dropped as malformed before import
    pub skipped_lines: usize,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Imported {} cookies", self.imported_count)?;
        if self.failed_count > 0 {
            write!(f, ", {} failed", self.failed_count)?;
        }
        if self.skipped_lines > 0 {
            write!(f, ", {} malformed lines skipped", self.skipped_lines)?;
        }
        Ok(())
    }
}

/// Write decoded records to the jar one at a time.
///
/// Each record succeeds or fails on its own; individual failures are only
/// counted.
pub async fn apply_import<J: CookieJar>(jar: &J, records: &[CookieRecord]) -> ImportReport {
    let mut report = ImportReport::default();
    for record in records {
        match import_record(jar, record).await {
            Ok(()) => report.imported_count += 1,
            Err(err) => {
                log::warn!("Failed to import cookie {}: {}", record.name, err);
                report.failed_count += 1;
            }
        }
    }
    log::info!("{}", report);
    report
}

async fn import_record<J: CookieJar>(jar: &J, record: &CookieRecord) -> Result<()> {
    if record.name.is_empty() || record.domain.is_empty() {
        return Err(ValidationError::MissingNameOrDomain.into());
    }
    let prepared = with_import_defaults(record);
    let url = cookie_url(&prepared)?;
    jar.set(&prepared, &url).await
}

fn with_import_defaults(record: &CookieRecord) -> CookieRecord {
    let mut prepared = record.clone();
    if prepared.path.is_empty() {
        prepared.path = "/".to_string();
    }
    prepared
}
