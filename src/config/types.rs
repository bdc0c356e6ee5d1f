//! Configuration types.
//!
//! `Config` is the immutable value handed to every pipeline stage. It is built
//! by the CLI layer (see `Opt`) but can also be constructed directly.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_OUTPUT_DIR, DEFAULT_OUTPUT_FILENAME, MAXMIND_ARCHIVE_URL, MAXMIND_CHECKSUM_URL,
};
use crate::error_handling::PipelineError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Set of uppercase ISO country codes whose networks end up in the denylist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockedSet(BTreeSet<String>);

impl BlockedSet {
    /// Builds a set from raw codes, trimming and uppercasing each one.
    /// Blank entries are dropped.
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            codes
                .into_iter()
                .map(|c| c.as_ref().trim().to_ascii_uppercase())
                .filter(|c| !c.is_empty())
                .collect(),
        )
    }

    /// Membership test. `code` must already be uppercase.
    pub fn contains(&self, code: &str) -> bool {
        self.0.contains(code)
    }

    /// Whether no country is blocked.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of blocked countries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Codes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for BlockedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self.iter().collect();
        f.write_str(&codes.join(","))
    }
}

/// Download endpoints for the archive and its checksum.
///
/// Always the MaxMind URLs in production; tests point these at a local server.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Zipped CSV database
    pub archive_url: String,
    /// `sha256sum`-style checksum of the archive
    pub checksum_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            archive_url: MAXMIND_ARCHIVE_URL.to_string(),
            checksum_url: MAXMIND_CHECKSUM_URL.to_string(),
        }
    }
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use geo_denylist::{BlockedSet, Config};
///
/// let config = Config {
///     account_id: "123456".to_string(),
///     license_key: "secret".to_string(),
///     blocked_countries: BlockedSet::from_codes(["ru", "kp"]),
///     ..Default::default()
/// };
/// ```
#[derive(Clone)]
pub struct Config {
    /// MaxMind account ID (HTTP Basic user name)
    pub account_id: String,

    /// MaxMind license key (HTTP Basic password)
    pub license_key: String,

    /// Countries whose networks are written to the output
    pub blocked_countries: BlockedSet,

    /// Output file name
    pub output_filename: String,

    /// Directory the output file is published into
    pub output_dir: PathBuf,

    /// Parent of the per-run scratch directory (system temp dir if None)
    pub scratch_parent: Option<PathBuf>,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            license_key: String::new(),
            blocked_countries: BlockedSet::default(),
            output_filename: DEFAULT_OUTPUT_FILENAME.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            scratch_parent: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("account_id", &self.account_id)
            .field("license_key", &"[REDACTED]")
            .field("blocked_countries", &self.blocked_countries)
            .field("output_filename", &self.output_filename)
            .field("output_dir", &self.output_dir)
            .field("scratch_parent", &self.scratch_parent)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    /// Path the output file is published to.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_filename)
    }

    /// Checks the values the pipeline cannot run without.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::ConfigValidationError` if the credentials are
    /// empty, no country is blocked, a code is not two ASCII letters, or the
    /// output file name is empty or contains a path separator.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.account_id.trim().is_empty() {
            return Err(PipelineError::ConfigValidationError(
                "account ID must be provided".to_string(),
            ));
        }
        if self.license_key.trim().is_empty() {
            return Err(PipelineError::ConfigValidationError(
                "license key must be provided".to_string(),
            ));
        }
        if self.blocked_countries.is_empty() {
            return Err(PipelineError::ConfigValidationError(
                "at least one blocked country code must be provided".to_string(),
            ));
        }
        if let Some(bad) = self
            .blocked_countries
            .iter()
            .find(|c| c.len() != 2 || !c.bytes().all(|b| b.is_ascii_uppercase()))
        {
            return Err(PipelineError::ConfigValidationError(format!(
                "invalid country code {bad:?} (expected two letters)"
            )));
        }
        if self.output_filename.is_empty()
            || self.output_filename.contains(['/', '\\'])
            || self.output_filename == "."
            || self.output_filename == ".."
        {
            return Err(PipelineError::ConfigValidationError(format!(
                "invalid output file name {:?}",
                self.output_filename
            )));
        }
        Ok(())
    }
}
