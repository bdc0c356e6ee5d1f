//! Log output setup for the `log` facade.
//!
//! Two line formats are available. Plain lines carry a local timestamp, a
//! colored level and the module path with the crate prefix stripped. JSON
//! lines are one object each, suitable for journald or a log shipper.

use std::io::Write;

use colored::*;
use log::{Level, LevelFilter};
use serde_json::json;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

const CRATE_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::");

/// Installs `env_logger` as the global logger.
///
/// `RUST_LOG` directives are parsed first, then `level` replaces the global
/// threshold, so `--log-level` wins while per-module directives such as
/// `RUST_LOG=geo_denylist::fetch=trace` still apply. HTTP client internals
/// never log below info.
///
/// # Errors
///
/// `InitializationError::LoggerError` when a global logger is already set.
///
/// # Examples
///
/// ```bash
/// # Debug output for the download stage only
/// RUST_LOG=geo_denylist::fetch=debug geo_denylist --bc RU --log-level warn
///
/// # Machine-readable output under a service manager
/// geo_denylist -c /etc/geo_denylist.yaml --log-format json
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for noisy in ["reqwest", "hyper", "hyper_util"] {
        builder.filter_module(noisy, LevelFilter::Info.min(level));
    }

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{}",
                    json_line(
                        chrono::Utc::now().timestamp_millis(),
                        record.level(),
                        record.target(),
                        &record.args().to_string(),
                    )
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{} {:>5} {}: {}",
                    chrono::Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
                    paint_level(record.level()),
                    short_target(record.target()).cyan(),
                    record.args()
                )
            });
        }
    }

    builder.try_init()?;
    Ok(())
}

/// One JSON log object; the message is escaped by `serde_json`.
fn json_line(ts_millis: i64, level: Level, target: &str, msg: &str) -> String {
    json!({
        "ts": ts_millis,
        "level": level.as_str(),
        "target": target,
        "msg": msg,
    })
    .to_string()
}

fn paint_level(level: Level) -> ColoredString {
    let name = level.as_str();
    match level {
        Level::Error => name.red().bold(),
        Level::Warn => name.yellow(),
        Level::Info => name.green(),
        Level::Debug => name.blue(),
        Level::Trace => name.purple(),
    }
}

/// `geo_denylist::table::blocks` -> `table::blocks`; other crates unchanged.
fn short_target(target: &str) -> &str {
    target.strip_prefix(CRATE_PREFIX).unwrap_or(target)
}
