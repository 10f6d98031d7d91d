//! Utility functions and helpers

use crate::error::{CookieKitError, Result};
use std::path::{Path, PathBuf};

/// File system utilities
pub struct FileUtils;

impl FileUtils {
    /// Expand tilde (~) in file paths
    pub fn expand_path(path: &str) -> Result<PathBuf> {
        let rest = match path.strip_prefix('~') {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
            _ => return Ok(PathBuf::from(path)),
        };
        dirs::home_dir()
            .map(|home| home.join(rest))
            .ok_or_else(|| CookieKitError::Config("Cannot determine home directory".to_string()))
    }

    /// Check if file exists and is readable
    pub fn check_file_readable(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(CookieKitError::FileNotFound(format!(
                "File not found: {:?}",
                path
            )));
        }

        if !path.is_file() {
            return Err(CookieKitError::Config(format!(
                "Path is not a file: {:?}",
                path
            )));
        }

        std::fs::File::open(path).map_err(|e| {
            CookieKitError::PermissionDenied(format!("Cannot read file {:?}: {}", path, e))
        })?;

        Ok(())
    }
}

/// String utilities
pub struct StringUtils;

impl StringUtils {
    /// Parse an expiration given on the command line.
    ///
    /// Accepts absolute Unix seconds (`1767225600`) or an offset from `now`
    /// with a unit suffix (`+30m`, `+12h`, `+7d`, `+90s`).
    pub fn parse_expiration(input: &str, now: f64) -> Result<f64> {
        let input = input.trim();
        let Some(offset) = input.strip_prefix('+') else {
            return input
                .parse::<f64>()
                .ok()
                .filter(|seconds| seconds.is_finite())
                .map(f64::trunc)
                .ok_or_else(|| {
                    CookieKitError::Config(format!("Invalid expiration timestamp: '{}'", input))
                });
        };

        let (number_part, unit) = if let Some(stripped) = offset.strip_suffix('s') {
            (stripped, 1u64)
        } else if let Some(stripped) = offset.strip_suffix('m') {
            (stripped, 60)
        } else if let Some(stripped) = offset.strip_suffix('h') {
            (stripped, 3600)
        } else if let Some(stripped) = offset.strip_suffix('d') {
            (stripped, 86_400)
        } else {
            return Err(CookieKitError::Config(format!(
                "Invalid expiration offset: '{}'. Use +N with a suffix (s/m/h/d)",
                input
            )));
        };

        let seconds = number_part
            .parse::<u64>()
            .ok()
            .and_then(|number| number.checked_mul(unit))
            .ok_or_else(|| {
                CookieKitError::Config(format!("Invalid expiration offset: '{}'", input))
            })?;

        Ok((now + seconds as f64).trunc())
    }
}
