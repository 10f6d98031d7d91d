//! Netscape cookie file codec
//!
//! Each record is one line of seven tab-separated fields:
//! `domain, includeSubdomains, path, secure, expiration, name, value`.
//! The format has no slots for httpOnly, SameSite or partition keys, so
//! those come back as defaults after a round trip.

use crate::record::CookieRecord;

/// Fixed header written at the top of every export
pub const NETSCAPE_HEADER: &str =
    "# Netscape HTTP Cookie File\n# This is a generated file! Do not edit.\n\n";

const FIELD_COUNT: usize = 7;

/// Records decoded from a Netscape file plus the number of lines skipped as
/// malformed (comments and blank lines are not counted).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetscapeDecode {
    pub records: Vec<CookieRecord>,
    pub dropped: usize,
}

pub fn encode_netscape(records: &[CookieRecord]) -> String {
    let mut out = String::from(NETSCAPE_HEADER);
    for record in records {
        out.push_str(&format_line(record));
        out.push('\n');
    }
    out
}

fn format_line(record: &CookieRecord) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
        record.domain,
        flag(record.includes_subdomains()),
        record.path,
        flag(record.secure),
        format_expiration(record.expiration_date),
        record.name,
        record.value
    )
}

fn flag(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

fn format_expiration(expiration: Option<f64>) -> String {
    match expiration {
        Some(seconds) => seconds.to_string(),
        None => "0".to_string(),
    }
}

/// Decode a Netscape file, silently skipping lines that cannot be read.
pub fn decode_netscape(text: &str) -> Vec<CookieRecord> {
    decode_netscape_with_report(text).records
}

/// Decode a Netscape file and count the malformed lines that were skipped.
pub fn decode_netscape_with_report(text: &str) -> NetscapeDecode {
    let mut decoded = NetscapeDecode::default();

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_line(line) {
            Some(record) => decoded.records.push(record),
            None => {
                log::warn!("Skipping malformed cookie line {}", index + 1);
                decoded.dropped += 1;
            }
        }
    }

    decoded
}

fn parse_line(line: &str) -> Option<CookieRecord> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < FIELD_COUNT {
        return None;
    }

    // fields[1] (include subdomains) is ignored: the domain's own leading
    // dot is authoritative.
    let expiration_date = parse_expiration(fields[4])?;

    Some(CookieRecord {
        domain: fields[0].to_string(),
        path: fields[2].to_string(),
        secure: fields[3] == "TRUE",
        expiration_date,
        name: fields[5].to_string(),
        value: fields[6].to_string(),
        ..CookieRecord::default()
    })
}

/// `"0"` is a session record. Anything else must start with an integer;
/// a fractional part is truncated.
fn parse_expiration(field: &str) -> Option<Option<f64>> {
    let field = field.trim();
    if field == "0" {
        return Some(None);
    }
    let integral = field.split('.').next().unwrap_or(field);
    integral.parse::<i64>().ok().map(|seconds| Some(seconds as f64))
}
