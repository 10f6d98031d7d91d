//! JSON array codec

use crate::error::{CookieKitError, Result};
use crate::record::CookieRecord;
use serde_json::Value;

/// Serialize records as a pretty-printed JSON array.
pub fn encode_json(records: &[CookieRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Records decoded from a JSON array plus the entries that could not be
/// read as a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonDecode {
    pub records: Vec<CookieRecord>,
    pub rejected: usize,
}

/// Parse a JSON array of records, skipping entries that are not records.
pub fn decode_json(text: &str) -> Result<Vec<CookieRecord>> {
    Ok(decode_json_with_report(text)?.records)
}

/// Parse a JSON array of records and count the rejected entries.
///
/// Only text that is not JSON, or JSON that is not a top-level array, fails
/// as a whole. Entries are not validated beyond their shape; missing or
/// `null` fields take their defaults and are judged by the import pipeline.
pub fn decode_json_with_report(text: &str) -> Result<JsonDecode> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| CookieKitError::Parse(format!("invalid JSON: {}", e)))?;

    let Value::Array(entries) = value else {
        return Err(CookieKitError::Parse("expected array".to_string()));
    };

    let mut decoded = JsonDecode::default();
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value(entry) {
            Ok(record) => decoded.records.push(record),
            Err(e) => {
                log::warn!("Skipping cookie entry {}: {}", index, e);
                decoded.rejected += 1;
            }
        }
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::{decode_json, decode_json_with_report, encode_json};
    use crate::error::CookieKitError;
    use crate::record::{CookieRecord, SameSite};
    use serde_json::json;

    #[test]
    fn decode_reverses_encode() {
        let records = vec![
            CookieRecord {
                secure: true,
                http_only: true,
                same_site: SameSite::NoRestriction,
                expiration_date: Some(1_767_225_600.5),
                store_id: Some("0".to_string()),
                partition_key: Some(json!({"topLevelSite": "https://a.example"})),
                ..CookieRecord::new("sid", "abc", ".example.com")
            },
            CookieRecord::new("theme", "", "b.example"),
        ];
        let text = encode_json(&records).expect("encode");
        assert_eq!(decode_json(&text).expect("decode"), records);
    }

    #[test]
    fn encode_is_indented() {
        let text = encode_json(&[CookieRecord::new("a", "b", "c")]).expect("encode");
        assert!(text.starts_with("[\n  {\n    \"name\": \"a\""));
    }

    #[test]
    fn decode_requires_array() {
        for input in [r#"{"name":"a"}"#, "42", "\"text\"", "null"] {
            let err = decode_json(input).expect_err("not an array");
            match err {
                CookieKitError::Parse(message) => assert_eq!(message, "expected array"),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn decode_rejects_malformed_text() {
        let err = decode_json("[{").expect_err("malformed");
        assert!(matches!(err, CookieKitError::Parse(_)));
    }

    #[test]
    fn decode_fills_missing_fields_with_defaults() {
        let records = decode_json(r#"[{"name":"a","hostOnly":true}]"#).expect("decode");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "a");
        assert!(records[0].domain.is_empty());
        assert!(records[0].path.is_empty());
        assert!(!records[0].secure);
        assert_eq!(records[0].same_site, SameSite::Unspecified);
    }

    #[test]
    fn decode_counts_entries_with_wrong_shape() {
        let decoded =
            decode_json_with_report(r#"[{"name":"a"}, 7, {"name":"b","sameSite":"sometimes"}]"#)
                .expect("decode");
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.records[0].name, "a");
        assert_eq!(decoded.rejected, 2);
    }

    #[test]
    fn decode_tolerates_null_and_foreign_same_site() {
        let records = decode_json(
            r#"[{"name":"a","domain":"example.com","value":null,"secure":null,"sameSite":null},
                {"name":"b","domain":"example.com","sameSite":"Lax"}]"#,
        )
        .expect("decode");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value, "");
        assert!(!records[0].secure);
        assert_eq!(records[0].same_site, SameSite::Unspecified);
        assert_eq!(records[1].same_site, SameSite::Lax);
    }
}
