//! Tracing setup for the annotation services.
//!
//! Compact stdout output is always on. Setting `ANNOTATORS_LOG_FILE` mirrors events into
//! that file without ANSI colours.
use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_VAR: &str = "ANNOTATORS_LOG_FILE";

// Flushes buffered file output on drop; lives as long as the process.
static FILE_WRITER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber. `RUST_LOG` controls filtering and defaults to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = std::env::var(LOG_FILE_VAR)
        .ok()
        .filter(|path| !path.trim().is_empty())
        .and_then(|path| open_log_file(Path::new(&path)))
        .map(|writer| {
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .compact()
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .with(file_layer)
        .init();
}

fn open_log_file(path: &Path) -> Option<NonBlocking> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| eprintln!("Cannot append to log file {}: {err}", path.display()))
        .ok()?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    let _ = FILE_WRITER_GUARD.set(guard);
    Some(writer)
}
