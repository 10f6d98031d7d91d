//! Record snapshot and the manager that keeps it in step with the jar

use super::{apply_bulk_delete, apply_import, BulkDeleteReport, ImportReport};
use crate::codec::{decode_json_with_report, decode_netscape_with_report, InterchangeFormat};
use crate::error::{CookieKitError, Result};
use crate::jar::{CookieJar, JarQuery};
use crate::query::{self, CookieFilter, CookieStats, DomainGroup};
use crate::record::{CookieDraft, CookieRecord};
use serde_json::Value;
use std::fmt;

/// Result of one bulk read from the jar
///
/// A session is never patched. Every successful mutation replaces it with a
/// fresh read and bumps the generation.
#[derive(Debug, Clone, Default)]
pub struct CookieSession {
    generation: u64,
    query: JarQuery,
    records: Vec<CookieRecord>,
}

impl CookieSession {
    /// Zero until the first reload
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &JarQuery {
        &self.query
    }

    pub fn records(&self) -> &[CookieRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn filtered(&self, filter: &CookieFilter, now: f64) -> Vec<CookieRecord> {
        query::filter(&self.records, filter, now)
    }

    pub fn stats(&self, filter: &CookieFilter, now: f64) -> CookieStats {
        query::stats(&self.records, &self.filtered(filter, now))
    }

    pub fn groups(&self, filter: &CookieFilter, now: f64) -> Vec<DomainGroup> {
        query::group_by_domain(&self.filtered(filter, now))
    }

    /// Records whose domain is exactly `domain`
    pub fn domain_records(&self, domain: &str) -> Vec<CookieRecord> {
        self.records
            .iter()
            .filter(|record| record.domain == domain)
            .cloned()
            .collect()
    }

    /// Record at this address in exactly this partition
    pub fn find(
        &self,
        name: &str,
        domain: &str,
        path: &str,
        partition_key: Option<&Value>,
    ) -> Option<&CookieRecord> {
        self.find_all(name, domain, path)
            .into_iter()
            .find(|c| c.partition_key.as_ref() == partition_key)
    }

    /// Records at this address across all partitions
    pub fn find_all(&self, name: &str, domain: &str, path: &str) -> Vec<&CookieRecord> {
        self.records
            .iter()
            .filter(|c| c.name == name && c.domain == domain && c.path == path)
            .collect()
    }
}

/// Encoded export ready to hand to a download surface
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPayload {
    pub text: String,
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub format: InterchangeFormat,
    pub count: usize,
}

impl fmt::Display for ExportPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Exported {} cookies to {}", self.count, self.format)
    }
}

/// Owns a jar and the snapshot read from it
pub struct CookieManager<J> {
    jar: J,
    query: JarQuery,
    session: CookieSession,
}

impl<J: CookieJar> CookieManager<J> {
    pub fn new(jar: J) -> Self {
        Self::with_query(jar, JarQuery::all())
    }

    /// Manager limited to records whose domain is exactly `domain`
    pub fn for_domain(jar: J, domain: impl Into<String>) -> Self {
        Self::with_query(jar, JarQuery::domain(domain))
    }

    fn with_query(jar: J, query: JarQuery) -> Self {
        Self {
            jar,
            session: CookieSession {
                query: query.clone(),
                ..CookieSession::default()
            },
            query,
        }
    }

    pub fn jar(&self) -> &J {
        &self.jar
    }

    pub fn session(&self) -> &CookieSession {
        &self.session
    }

    /// Replace the snapshot with a fresh bulk read.
    pub async fn reload(&mut self) -> Result<&CookieSession> {
        let records = self.jar.list(&self.query).await?;
        self.session = CookieSession {
            generation: self.session.generation + 1,
            query: self.query.clone(),
            records,
        };
        log::debug!(
            "Loaded {} cookies (generation {})",
            self.session.len(),
            self.session.generation
        );
        Ok(&self.session)
    }

    pub async fn apply_edit(
        &mut self,
        original: &CookieRecord,
        draft: &CookieDraft,
    ) -> Result<CookieRecord> {
        match super::apply_edit(&self.jar, original, draft).await {
            Ok(written) => {
                self.reload().await?;
                Ok(written)
            }
            Err(err @ CookieKitError::RemovedButNotRecreated { .. }) => {
                // The jar changed even though the edit failed.
                if let Err(reload_err) = self.reload().await {
                    log::warn!("Reload after failed edit also failed: {}", reload_err);
                }
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn apply_delete(&mut self, record: &CookieRecord) -> Result<()> {
        super::apply_delete(&self.jar, record).await?;
        self.reload().await?;
        Ok(())
    }

    /// Delete every snapshot record whose domain is exactly `domain`.
    pub async fn delete_domain(&mut self, domain: &str) -> Result<BulkDeleteReport> {
        let targets = self.session.domain_records(domain);
        self.delete_records(&targets).await
    }

    /// Delete every record in the snapshot.
    pub async fn delete_all(&mut self) -> Result<BulkDeleteReport> {
        let targets = self.session.records.clone();
        self.delete_records(&targets).await
    }

    async fn delete_records(&mut self, targets: &[CookieRecord]) -> Result<BulkDeleteReport> {
        let report = apply_bulk_delete(&self.jar, targets).await;
        if report.deleted_count > 0 {
            self.reload().await?;
        }
        Ok(report)
    }

    /// Decode `text` and import it. A parse failure of the whole input aborts
    /// before any jar call; JSON entries that are not records count as
    /// failed.
    pub async fn import_text(
        &mut self,
        text: &str,
        format: InterchangeFormat,
    ) -> Result<ImportReport> {
        let (records, rejected, skipped_lines) = match format {
            InterchangeFormat::Json => {
                let decoded = decode_json_with_report(text)?;
                (decoded.records, decoded.rejected, 0)
            }
            InterchangeFormat::Netscape => {
                let decoded = decode_netscape_with_report(text);
                (decoded.records, 0, decoded.dropped)
            }
        };

        let mut report = apply_import(&self.jar, &records).await;
        report.failed_count += rejected;
        report.skipped_lines = skipped_lines;
        if report.imported_count > 0 {
            self.reload().await?;
        }
        Ok(report)
    }

    /// Encode the filtered snapshot.
    pub fn export_text(
        &self,
        filter: &CookieFilter,
        format: InterchangeFormat,
        now: f64,
    ) -> Result<ExportPayload> {
        let records = self.session.filtered(filter, now);
        Ok(ExportPayload {
            text: format.encode(&records)?,
            file_name: format.file_name(),
            mime_type: format.mime_type(),
            format,
            count: records.len(),
        })
    }
}
