//! Log output for the server: compact lines on stdout plus a plain-text copy in a file.
//!
//! `RUST_LOG` picks the filter and defaults to `info`.
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_PATH: &str = "logs/student-records.log";

// Dropping the guard would stop the background writer and lose buffered lines.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber, writing to `log_file` or `logs/student-records.log`.
///
/// A log file that cannot be created is reported on stderr and skipped; stdout logging
/// still comes up.
pub fn init_tracing(log_file: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout = fmt::layer().with_target(false).compact();

    let file = open_log_file(Path::new(log_file.unwrap_or(DEFAULT_LOG_PATH))).map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .compact()
    });

    // A `None` layer is a no-op.
    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file)
        .init();
}

fn open_log_file(path: &Path) -> Option<NonBlocking> {
    let (dir, name) = split_log_path(path)?;
    if let Err(err) = std::fs::create_dir_all(&dir) {
        eprintln!("Cannot create log directory {}: {err}", dir.display());
        return None;
    }
    // `never` appends to one file and does not rotate.
    let appender = tracing_appender::rolling::never(dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = FILE_GUARD.set(guard);
    Some(writer)
}

/// Directory and file name for a log path; a bare file name lives in the working directory.
fn split_log_path(path: &Path) -> Option<(PathBuf, PathBuf)> {
    let name = PathBuf::from(path.file_name()?);
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Some((dir, name))
}
