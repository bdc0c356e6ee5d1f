//! Application configuration and constants.
//!
//! This module provides:
//! - Vendor contract constants (URLs, member names) and limits
//! - The library `Config` value and `BlockedSet`
//! - CLI option parsing and YAML config file merging

mod cli;
mod constants;
mod file;
mod types;

// Re-export all constants
pub use cli::Opt;
pub use constants::*;
pub use file::FileConfig;
pub use types::{BlockedSet, Config, Endpoints, LogFormat, LogLevel};
