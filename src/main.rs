//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `geo_denylist` library that handles:
//! - Command-line argument parsing and config file merging
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use geo_denylist::config::Opt;
use geo_denylist::initialization::init_logger_with;
use geo_denylist::{run_pipeline, Stage};

#[tokio::main]
async fn main() -> Result<()> {
    // Load MAXMIND_ACCOUNT_ID / MAXMIND_LICENSE_KEY from .env if present,
    // first in the current directory, then next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let opt = Opt::parse();

    let log_level = opt.log_level.clone();
    let log_format = opt.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    let config = match opt.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("geo_denylist error: {}: {:#}", Stage::Config, e);
            process::exit(1);
        }
    };

    match run_pipeline(&config).await {
        Ok(report) => {
            println!(
                "Wrote {} network{} for {} to {} in {:.1}s",
                report.lines_emitted,
                if report.lines_emitted == 1 { "" } else { "s" },
                config.blocked_countries,
                report.output_path.display(),
                report.elapsed_seconds
            );
            Ok(())
        }
        Err(e) => {
            let stage = e.stage();
            eprintln!("geo_denylist error: {}: {:#}", stage, anyhow::Error::from(e));
            process::exit(1);
        }
    }
}
