// src/logging.rs

//! Global `tracing` subscriber for the `slotdag` binary.
//!
//! The level is picked from, in order: `--log-level`, the `SLOTDAG_LOG`
//! environment variable, then `info`. Output goes to stderr; stdout is left
//! for the dry-run listing and the final summary.

use anyhow::{Result, anyhow};
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Install the subscriber. Call once, before the scheduler is built.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var("SLOTDAG_LOG").ok();
    let level = resolve_level(cli_level, env_value.as_deref());

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}

/// Effective level for the given CLI flag and `SLOTDAG_LOG` value.
///
/// An unparsable environment value is ignored.
pub fn resolve_level(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Level {
    if let Some(lvl) = cli_level {
        return match lvl {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        };
    }

    env_value.and_then(parse_level_str).unwrap_or(Level::INFO)
}

/// Case-insensitive level name; `warning` is accepted for `warn`.
pub fn parse_level_str(s: &str) -> Option<Level> {
    let level = match s.trim().to_ascii_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" | "warning" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => return None,
    };
    Some(level)
}
