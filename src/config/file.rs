//! YAML configuration file.
//!
//! ```yaml
//! account_id: "123456"
//! license_key: "xxxxxxxx"
//! blocked_countries: [RU, KP]
//! output_filepath: /etc/firewall
//! output_filename: BlockedCountriesBlocks.txt
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Values read from the configuration file. Every key is optional; the CLI
/// fills or overrides them (see `Opt::into_config`).
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// MaxMind account ID
    pub account_id: Option<String>,
    /// MaxMind license key
    pub license_key: Option<String>,
    /// Country codes, any case
    pub blocked_countries: Vec<String>,
    /// Output directory
    pub output_filepath: Option<PathBuf>,
    /// Output file name
    pub output_filename: Option<String>,
}

impl FileConfig {
    /// Reads and parses a YAML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}
