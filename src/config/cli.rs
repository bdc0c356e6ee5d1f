//! Command-line options.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::config::constants::{
    DEFAULT_OUTPUT_DIR, DEFAULT_OUTPUT_FILENAME, MAXMIND_ACCOUNT_ID_ENV, MAXMIND_LICENSE_KEY_ENV,
};
use crate::config::file::FileConfig;
use crate::config::types::{BlockedSet, Config, LogFormat, LogLevel};

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Credentials from the environment, two countries
/// geo_denylist --bc RU --bc KP --outpath /etc/firewall
///
/// # Everything from a config file, log as JSON
/// geo_denylist -c /etc/geo_denylist.yaml --log-format json
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "geo_denylist",
    about = "Builds a denylist of IPv4 networks for the given countries from MaxMind GeoLite2 data."
)]
pub struct Opt {
    /// YAML config file (command-line values take precedence)
    #[arg(short = 'c', long = "config", value_parser)]
    pub config: Option<PathBuf>,

    /// MaxMind account ID
    #[arg(long = "id", env = MAXMIND_ACCOUNT_ID_ENV, hide_env_values = true)]
    pub account_id: Option<String>,

    /// MaxMind license key
    #[arg(long = "key", env = MAXMIND_LICENSE_KEY_ENV, hide_env_values = true)]
    pub license_key: Option<String>,

    /// Output directory
    #[arg(long = "outpath", value_parser)]
    pub output_dir: Option<PathBuf>,

    /// Output file name [default: BlockedCountriesBlocks.txt]
    #[arg(long = "outname")]
    pub output_filename: Option<String>,

    /// ISO country code to block (can be used multiple times)
    #[arg(long = "bc", value_name = "CC")]
    pub blocked_countries: Vec<String>,

    /// Directory in which the per-run scratch directory is created.
    ///
    /// Put this on the same filesystem as the output directory so the final
    /// rename stays atomic.
    #[arg(long = "scratch-dir", value_parser)]
    pub scratch_dir: Option<PathBuf>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Opt {
    /// Merges the command line with the optional config file.
    ///
    /// Values given on the command line win; the file fills in the rest. The
    /// file's country list is only used when no `--bc` flag was given.
    /// Validation is left to the pipeline (`Config::validate`).
    pub fn into_config(self) -> Result<Config> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(self.merge(file))
    }

    fn merge(self, file: FileConfig) -> Config {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());

        let blocked_countries = if self.blocked_countries.is_empty() {
            BlockedSet::from_codes(&file.blocked_countries)
        } else {
            BlockedSet::from_codes(&self.blocked_countries)
        };

        Config {
            account_id: non_empty(self.account_id)
                .or_else(|| non_empty(file.account_id))
                .unwrap_or_default(),
            license_key: non_empty(self.license_key)
                .or_else(|| non_empty(file.license_key))
                .unwrap_or_default(),
            blocked_countries,
            output_filename: non_empty(self.output_filename)
                .or_else(|| non_empty(file.output_filename))
                .unwrap_or_else(|| DEFAULT_OUTPUT_FILENAME.to_string()),
            output_dir: self
                .output_dir
                .or(file.output_filepath)
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            scratch_parent: self.scratch_dir,
            log_level: self.log_level,
            log_format: self.log_format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Opt {
        let mut argv = vec!["geo_denylist"];
        argv.extend_from_slice(args);
        Opt::try_parse_from(argv).expect("valid arguments")
    }

    #[test]
    fn test_repeated_country_flags() {
        let opt = parse(&["--id", "1", "--key", "k", "--bc", "ru", "--bc", "KP"]);
        assert_eq!(opt.blocked_countries, vec!["ru", "KP"]);
        let config = opt.merge(FileConfig::default());
        assert!(config.blocked_countries.contains("RU"));
        assert!(config.blocked_countries.contains("KP"));
    }

    #[test]
    fn test_defaults_without_file() {
        let config = parse(&["--id", "1", "--key", "k"]).merge(FileConfig::default());
        assert_eq!(config.output_filename, DEFAULT_OUTPUT_FILENAME);
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert!(config.scratch_parent.is_none());
    }

    #[test]
    fn test_cli_values_take_precedence_over_file() {
        let file = FileConfig {
            account_id: Some("file-id".into()),
            license_key: Some("file-key".into()),
            blocked_countries: vec!["CN".into()],
            output_filepath: Some(PathBuf::from("/from/file")),
            output_filename: Some("file.txt".into()),
        };
        let config = parse(&[
            "--id", "cli-id", "--key", "cli-key", "--bc", "ru", "--outpath", "/from/cli",
            "--outname", "cli.txt",
        ])
        .merge(file);

        assert_eq!(config.account_id, "cli-id");
        assert_eq!(config.license_key, "cli-key");
        assert!(config.blocked_countries.contains("RU"));
        assert!(!config.blocked_countries.contains("CN"));
        assert_eq!(config.output_dir, PathBuf::from("/from/cli"));
        assert_eq!(config.output_filename, "cli.txt");
    }

    #[test]
    fn test_file_fills_missing_values() {
        let file = FileConfig {
            account_id: Some("file-id".into()),
            license_key: Some("file-key".into()),
            blocked_countries: vec!["cn".into(), "ir".into()],
            output_filepath: Some(PathBuf::from("/from/file")),
            output_filename: Some("file.txt".into()),
        };
        let opt = Opt {
            config: None,
            account_id: None,
            license_key: Some(String::new()),
            output_dir: None,
            output_filename: None,
            blocked_countries: Vec::new(),
            scratch_dir: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        };
        let config = opt.merge(file);

        assert_eq!(config.account_id, "file-id");
        assert_eq!(config.license_key, "file-key");
        assert_eq!(config.blocked_countries.to_string(), "CN,IR");
        assert_eq!(config.output_dir, PathBuf::from("/from/file"));
        assert_eq!(config.output_filename, "file.txt");
    }

    #[test]
    fn test_into_config_reads_file() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("cfg.yaml");
        std::fs::write(&path, "account_id: \"99\"\nblocked_countries: [de]\n")
            .expect("write config");

        let config = parse(&["-c", path.to_str().unwrap(), "--key", "k"])
            .into_config()
            .expect("config loads");
        assert_eq!(config.account_id, "99");
        assert!(config.blocked_countries.contains("DE"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_into_config_missing_file_is_error() {
        let result = parse(&["-c", "/nonexistent/geo_denylist.yaml"]).into_config();
        assert!(result.is_err());
    }
}
