//! Tracing bootstrap.
//!
//! Logging goes to stdout with a compact formatter. When a log file is
//! configured, records are additionally appended there through a non-blocking
//! writer so ingestion hot paths never contend on file I/O.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// Keeps the non-blocking worker alive for the process lifetime.
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber: an `RUST_LOG` filter defaulting to `info`,
/// a compact stdout layer, and an append-mode file layer when `log_file` is
/// configured.
pub fn init_tracing(log_file: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = log_file
        .and_then(open_log_writer)
        .map(|writer| fmt::layer().with_writer(writer).with_ansi(false).compact());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .with(file_layer)
        .init();
}

/// Open `path` for appending, creating parent directories as needed. A path
/// that cannot be opened disables the file layer instead of aborting startup.
fn open_log_writer(path: &Path) -> Option<NonBlocking> {
    if let Some(parent) = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        if let Err(error) = std::fs::create_dir_all(parent) {
            eprintln!(
                "wikirag: cannot create log directory {}: {error}",
                parent.display()
            );
            return None;
        }
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(writer)
        }
        Err(error) => {
            eprintln!("wikirag: cannot open log file {}: {error}", path.display());
            None
        }
    }
}
