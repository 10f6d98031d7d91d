//! Filtering, grouping and counting over a record snapshot
//!
//! Everything here is pure: inputs are borrowed and new sequences are
//! returned, so a snapshot can be queried any number of times.

use crate::record::CookieRecord;
use std::collections::{BTreeMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

/// Predicates combined with logical AND. Unset predicates always pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieFilter {
    /// Case-insensitive substring matched against name, domain and value
    pub text: Option<String>,
    pub secure_only: bool,
    pub http_only: bool,
    pub session_only: bool,
    pub expired_only: bool,
}

impl CookieFilter {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle().is_none()
            && !self.secure_only
            && !self.http_only
            && !self.session_only
            && !self.expired_only
    }

    fn needle(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(|text| text.trim().to_lowercase())
            .filter(|text| !text.is_empty())
    }

    /// `now` is in seconds since the Unix epoch.
    pub fn matches(&self, record: &CookieRecord, now: f64) -> bool {
        if let Some(needle) = self.needle() {
            if !matches_text(record, &needle) {
                return false;
            }
        }
        (!self.secure_only || record.secure)
            && (!self.http_only || record.http_only)
            && (!self.session_only || record.is_session())
            && (!self.expired_only || record.is_expired_at(now))
    }
}

fn matches_text(record: &CookieRecord, needle: &str) -> bool {
    [&record.name, &record.domain, &record.value]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

pub fn filter(records: &[CookieRecord], filter: &CookieFilter, now: f64) -> Vec<CookieRecord> {
    records
        .iter()
        .filter(|record| filter.matches(record, now))
        .cloned()
        .collect()
}

/// Records sharing one literal `domain` value
#[derive(Debug, Clone, PartialEq)]
pub struct DomainGroup {
    pub domain: String,
    pub records: Vec<CookieRecord>,
}

/// Group by the raw `domain` string, ascending.
///
/// `.example.com` and `example.com` are separate groups and the dotted one
/// sorts first. Records keep their relative order inside a group.
pub fn group_by_domain(records: &[CookieRecord]) -> Vec<DomainGroup> {
    let mut groups: BTreeMap<&str, Vec<CookieRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.domain.as_str())
            .or_default()
            .push(record.clone());
    }
    groups
        .into_iter()
        .map(|(domain, records)| DomainGroup {
            domain: domain.to_string(),
            records,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CookieStats {
    pub total: usize,
    pub filtered: usize,
    /// Distinct domains in the filtered set
    pub domains: usize,
}

pub fn stats(all: &[CookieRecord], filtered: &[CookieRecord]) -> CookieStats {
    let domains: HashSet<&str> = filtered.iter().map(|c| c.domain.as_str()).collect();
    CookieStats {
        total: all.len(),
        filtered: filtered.len(),
        domains: domains.len(),
    }
}

/// Current time in seconds since the Unix epoch
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}
