//! Interchange formats for cookie records
//!
//! Two independent codec pairs live here: a JSON array format and the
//! tab-separated Netscape format understood by curl and wget. Both operate
//! on whole record lists and never touch the jar.

use crate::error::{CookieKitError, Result};
use crate::record::CookieRecord;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub mod json;
pub mod netscape;

pub use json::{decode_json, decode_json_with_report, encode_json, JsonDecode};
pub use netscape::{decode_netscape, decode_netscape_with_report, encode_netscape, NetscapeDecode};

/// Supported interchange formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterchangeFormat {
    Json,
    Netscape,
}

impl InterchangeFormat {
    /// Files named `*.json` are JSON, everything else is Netscape.
    pub fn from_path(path: &Path) -> Self {
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            InterchangeFormat::Json
        } else {
            InterchangeFormat::Netscape
        }
    }

    /// Default download name
    pub fn file_name(&self) -> &'static str {
        match self {
            InterchangeFormat::Json => "cookies.json",
            InterchangeFormat::Netscape => "cookies.txt",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            InterchangeFormat::Json => "application/json",
            InterchangeFormat::Netscape => "text/plain",
        }
    }

    pub fn encode(&self, records: &[CookieRecord]) -> Result<String> {
        match self {
            InterchangeFormat::Json => encode_json(records),
            InterchangeFormat::Netscape => Ok(encode_netscape(records)),
        }
    }

    pub fn decode(&self, text: &str) -> Result<Vec<CookieRecord>> {
        match self {
            InterchangeFormat::Json => decode_json(text),
            InterchangeFormat::Netscape => Ok(decode_netscape(text)),
        }
    }
}

impl fmt::Display for InterchangeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterchangeFormat::Json => write!(f, "JSON"),
            InterchangeFormat::Netscape => write!(f, "Netscape"),
        }
    }
}

impl FromStr for InterchangeFormat {
    type Err = CookieKitError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(InterchangeFormat::Json),
            "netscape" | "txt" | "cookies.txt" => Ok(InterchangeFormat::Netscape),
            _ => Err(CookieKitError::Config(format!(
                "Unknown cookie format: {}",
                s
            ))),
        }
    }
}
