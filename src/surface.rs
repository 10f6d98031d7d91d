//! File and confirmation collaborators
//!
//! The core never prompts or touches files itself. Front ends pass uploaded
//! text in and take encoded text out, and ask for confirmation before any
//! destructive bulk operation.

use crate::error::Result;
use crate::record::CookieRecord;
use crate::utils::FileUtils;
use encoding_rs::UTF_8;
use std::io::{self, BufRead, Write};
use std::path::Path;

pub const DELETE_ALL_PROMPT: &str =
    "Delete ALL cookies from your browser? This action cannot be undone.";

/// Blocking yes/no prompt
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Answers yes without asking (`--yes`)
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

/// Asks on stderr and reads the answer from stdin. End of input means no.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, message: &str) -> bool {
        eprint!("{} [y/N] ", message);
        let _ = io::stderr().flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_yes(&answer),
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub fn delete_cookie_prompt(record: &CookieRecord) -> String {
    format!("Delete cookie \"{}\" from {}?", record.name, record.domain)
}

pub fn delete_domain_prompt(domain: &str) -> String {
    format!("Delete all cookies from {}?", domain)
}

/// Read an uploaded interchange file as text.
pub fn read_uploaded_text(path: &Path) -> Result<String> {
    FileUtils::check_file_readable(path)?;
    let bytes = std::fs::read(path)?;
    Ok(decode_uploaded_bytes(&bytes))
}

/// UTF-8 unless a byte order mark says otherwise. Invalid sequences are
/// replaced rather than rejected.
pub fn decode_uploaded_bytes(bytes: &[u8]) -> String {
    let (text, encoding, had_errors) = UTF_8.decode(bytes);
    if had_errors {
        log::warn!(
            "Uploaded text contains invalid {} sequences",
            encoding.name()
        );
    }
    text.into_owned()
}
