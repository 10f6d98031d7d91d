//! Configuration management for cookiekit

use std::path::PathBuf;

/// Environment variable that overrides the jar location
pub const JAR_ENV: &str = "COOKIEKIT_JAR";

/// Output configuration
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub file: Option<PathBuf>,
    pub verbose: bool,
    pub silent: bool,
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite jar the commands operate on
    pub jar_path: PathBuf,
    /// Skip confirmation prompts
    pub assume_yes: bool,
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            jar_path: default_jar_path().unwrap_or_else(|| PathBuf::from("cookies.sqlite")),
            assume_yes: false,
            output: OutputConfig::default(),
        }
    }
}

/// `<data dir>/cookiekit/cookies.sqlite`
pub fn default_jar_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("cookiekit").join("cookies.sqlite"))
}
