//! Output formatting and display utilities

use crate::config::OutputConfig;
use crate::error::Result;
use crate::query::{CookieStats, DomainGroup};
use crate::record::CookieRecord;
use crate::reconcile::ExportPayload;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Output writer that handles file vs stdout
pub struct OutputWriter {
    config: OutputConfig,
}

impl OutputWriter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Write content to configured output
    pub fn write(&self, content: &str) -> Result<()> {
        if let Some(file_path) = &self.config.file {
            self.write_to_file(content, file_path)
        } else {
            self.write_to_stdout(content)
        }
    }

    /// Hand an export to the user: the configured file, or stdout.
    pub fn offer_download(&self, payload: &ExportPayload) -> Result<()> {
        self.write_verbose(&format!(
            "{} ({}, suggested name {})",
            payload, payload.mime_type, payload.file_name
        ))?;
        self.write(&payload.text)
    }

    /// Write verbose information (if enabled)
    pub fn write_verbose(&self, message: &str) -> Result<()> {
        if self.config.verbose && !self.config.silent {
            eprintln!("* {}", message);
        }
        Ok(())
    }

    /// Short success notice on stderr, so stdout stays clean for exports
    pub fn notify(&self, message: &str) -> Result<()> {
        if !self.config.silent {
            eprintln!("{}", message);
        }
        Ok(())
    }

    fn write_to_file(&self, content: &str, file_path: &Path) -> Result<()> {
        let mut file = File::create(file_path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_to_stdout(&self, content: &str) -> Result<()> {
        io::stdout().write_all(content.as_bytes())?;
        Ok(())
    }
}

pub fn stats_line(stats: &CookieStats) -> String {
    format!(
        "{} of {} cookies across {} domains",
        stats.filtered, stats.total, stats.domains
    )
}

/// Plain-text listing, one block per domain
pub fn render_groups(groups: &[DomainGroup], now: f64) -> String {
    let mut out = String::new();
    for group in groups {
        out.push_str(&format!("{} ({})\n", group.domain, group.records.len()));
        for record in &group.records {
            out.push_str(&format!("  {}\n", record_line(record, now)));
        }
    }
    out
}

fn record_line(record: &CookieRecord, now: f64) -> String {
    let mut parts = vec![
        format!("{}={}", record.name, record.value),
        format!("path={}", record.path),
    ];
    if record.secure {
        parts.push("secure".to_string());
    }
    if record.http_only {
        parts.push("httpOnly".to_string());
    }
    parts.push(format!("sameSite={}", record.same_site));
    parts.push(match record.expiration_date {
        None => "session".to_string(),
        Some(_) if record.is_expired_at(now) => "expired".to_string(),
        Some(expires) => format!("expires={}", expires),
    });
    parts.join("  ")
}
