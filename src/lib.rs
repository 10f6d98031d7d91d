//! cookiekit - inspect and edit browser cookie jars
//!
//! This crate normalizes cookie records between a cookie jar and two
//! interchange formats (JSON and Netscape), enforces the invariants the jar
//! requires before a write, and reconciles edits against the jar with a
//! delete-then-recreate protocol.

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod exit_code;
pub mod jar;
pub mod logging;
pub mod output;
pub mod query;
pub mod reconcile;
pub mod record;
pub mod surface;
pub mod utils;

pub use error::{CookieKitError, Result};
pub use record::{CookieDraft, CookieRecord, SameSite, ValidationError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
