//! Tracing setup.
//!
//! The TUI owns stdout/stderr, so events go to a log file when one is
//! configured and are dropped otherwise. `RUST_LOG` controls the filter
//! (default `info`).

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::error::{Context, Result, simple_error};

pub fn init(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false);

    let res = match log_file {
        Some(path) => {
            crate::app::config::ensure_parent(path)
                .with_ctx(|| format!("create log directory for {}", path.display()))?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_ctx(|| format!("open log file {}", path.display()))?;
            builder.with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(std::io::sink).try_init(),
    };
    res.map_err(|e| simple_error(format!("install tracing subscriber: {e}")))
}
