//! Canonical cookie record and the rules a record must satisfy before it is
//! written back to a jar.
//!
//! Field names serialize exactly as browsers expose them (`httpOnly`,
//! `sameSite`, `expirationDate`, ...), so a record list can be exported and
//! re-imported without a translation table.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// SameSite policy as reported by the jar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SameSite {
    #[default]
    Unspecified,
    Lax,
    Strict,
    /// Cross-site exposure; only accepted on secure records.
    NoRestriction,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Unspecified => "unspecified",
            SameSite::Lax => "lax",
            SameSite::Strict => "strict",
            SameSite::NoRestriction => "no_restriction",
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SameSite {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unspecified" | "" => Ok(SameSite::Unspecified),
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "no_restriction" | "none" => Ok(SameSite::NoRestriction),
            _ => Err(()),
        }
    }
}

/// Accepts any spelling `FromStr` does (`"Lax"`, `"None"`, ...). `null`
/// reads as unspecified.
impl<'de> Deserialize<'de> for SameSite {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(SameSite::Unspecified),
            Some(raw) => raw
                .parse()
                .map_err(|_| de::Error::custom(format!("unknown sameSite value '{}'", raw))),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One cookie entry
///
/// Every field has a serde default, and `null` counts as absent, so that
/// partially filled interchange entries still decode; the import pipeline
/// decides what is acceptable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CookieRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
    /// A leading `.` means "this domain and all subdomains".
    #[serde(deserialize_with = "null_as_default")]
    pub domain: String,
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub secure: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub http_only: bool,
    pub same_site: SameSite,
    /// Seconds since the Unix epoch. `None` means session-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    /// Opaque partition token, passed back to the jar untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<Value>,
}

/// Identity of a record inside one jar partition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CookieKey {
    pub name: String,
    pub domain: String,
    pub path: String,
    pub partition: Option<String>,
}

impl CookieRecord {
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: "/".to_string(),
            ..Self::default()
        }
    }

    /// Domain with a single leading dot removed
    pub fn host(&self) -> &str {
        self.domain.strip_prefix('.').unwrap_or(&self.domain)
    }

    pub fn includes_subdomains(&self) -> bool {
        self.domain.starts_with('.')
    }

    pub fn is_session(&self) -> bool {
        self.expiration_date.is_none()
    }

    /// Session records never count as expired.
    pub fn is_expired_at(&self, now: f64) -> bool {
        matches!(self.expiration_date, Some(expires) if expires < now)
    }

    pub fn key(&self) -> CookieKey {
        CookieKey {
            name: self.name.clone(),
            domain: self.domain.clone(),
            path: self.path.clone(),
            partition: self.partition_key.as_ref().map(Value::to_string),
        }
    }

    pub fn validate_for_write(&self) -> std::result::Result<(), ValidationError> {
        validate_for_write(self)
    }
}

/// A write-time invariant the record violates
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Cookie value cannot contain line breaks")]
    ValueContainsLineBreak,

    #[error("SameSite=None requires Secure=true")]
    NoRestrictionRequiresSecure,

    #[error("Missing required fields: name or domain")]
    MissingNameOrDomain,
}

/// Check a record before it is handed to the jar.
///
/// Line breaks are checked before the SameSite rule and only the first
/// violation is reported.
pub fn validate_for_write(record: &CookieRecord) -> std::result::Result<(), ValidationError> {
    if record.value.contains(['\n', '\r']) {
        return Err(ValidationError::ValueContainsLineBreak);
    }
    if record.same_site == SameSite::NoRestriction && !record.secure {
        return Err(ValidationError::NoRestrictionRequiresSecure);
    }
    Ok(())
}

/// Editable fields of a record
///
/// Everything else (name, domain, path, secure, partition) stays fixed for
/// the lifetime of the draft.
#[derive(Debug, Clone, PartialEq)]
pub struct CookieDraft {
    pub value: String,
    pub same_site: SameSite,
    pub expiration_date: Option<f64>,
}

impl CookieDraft {
    /// Seed a draft from the stored record. Seeding again resets the draft.
    pub fn from_record(record: &CookieRecord) -> Self {
        Self {
            value: record.value.clone(),
            same_site: record.same_site,
            expiration_date: record.expiration_date,
        }
    }

    /// Overlay the draft onto `original`.
    pub fn apply_to(&self, original: &CookieRecord) -> CookieRecord {
        CookieRecord {
            value: self.value.clone(),
            same_site: self.same_site,
            expiration_date: self.expiration_date,
            ..original.clone()
        }
    }

    pub fn is_unchanged(&self, original: &CookieRecord) -> bool {
        *self == Self::from_record(original)
    }
}
