//! Tracing subscriber setup.
//!
//! The interactive calculator owns the terminal, so while it runs every log
//! line goes to a file next to the flag store. One-shot commands log to
//! stderr instead.

use std::{
    fs::{self, OpenOptions},
    path::Path,
    sync::Mutex,
};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "installment.log";

/// Honours `RUST_LOG` when set and falls back to `info`.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"))
}

/// Initialise logging to stderr, without timestamps or targets.
pub fn init_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

/// Initialise logging to `<dir>/installment.log`, appending across sessions.
pub fn init_file(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create state directory {}", dir.display()))?;
    let path = dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
