//! Logging init: append to a file under the XDG state dir, or stderr when
//! that is not possible.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,rollfetch=debug,rollfetch_core=debug";

/// `RUST_LOG` when set and valid, `DEFAULT_FILTER` otherwise.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn install<W>(writer: W) -> Result<()>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))
}

/// Path of the log file: `~/.local/state/rollfetch/rollfetch.log`.
/// Creates the parent directory.
pub fn log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rollfetch")?;
    Ok(xdg_dirs.place_state_file("rollfetch.log")?)
}

/// Append structured logs to `path`. Fails if the file cannot be opened or a
/// global subscriber is already installed.
pub fn init_logging_to(path: &Path) -> Result<()> {
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file: {}", path.display()))?;
    install(Mutex::new(file))?;
    tracing::info!("rollfetch logging initialized at {}", path.display());
    Ok(())
}

/// Log to the XDG state log file. On error the caller falls back to
/// `init_logging_stderr`.
pub fn init_logging() -> Result<()> {
    init_logging_to(&log_path()?)
}

/// Log to stderr only. Does nothing if a subscriber is already installed.
pub fn init_logging_stderr() {
    let _ = install(io::stderr);
}
