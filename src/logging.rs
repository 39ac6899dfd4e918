//! Log setup. The terminal is in raw mode while playing, so logs go to a file.
//!
//! - `MATCH3_LOG`: filter directive (e.g. `debug`, `tui_match3_engine=trace`).
//!   Logging is off when unset.
//! - `MATCH3_LOG_PATH`: log file (default `tui-match3.log`).

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_PATH: &str = "tui-match3.log";

/// Install the global subscriber. Returns the log path when logging is on.
pub fn init_from_env() -> Result<Option<PathBuf>> {
    let Ok(directive) = std::env::var("MATCH3_LOG") else {
        return Ok(None);
    };
    let path = std::env::var_os("MATCH3_LOG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH));
    init(&directive, path.clone())?;
    Ok(Some(path))
}

pub fn init(directive: &str, path: PathBuf) -> Result<()> {
    let filter = EnvFilter::try_new(directive)
        .with_context(|| format!("invalid MATCH3_LOG filter {directive:?}"))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))?;
    Ok(())
}
