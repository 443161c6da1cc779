//! Logging infrastructure for fleetsync.
//!
//! Provides structured logging with file output and optional console output:
//! - Writes to `~/.fleetsync/fleetsync.log` by default (cleared on session start)
//! - Optionally mirrors to stderr, keeping stdout free for frame output
//! - Configurable via RUST_LOG environment variable

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
    log_file: PathBuf,
}

impl LoggingGuard {
    /// Path of the active log file.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }
}

/// Initialize logging system.
///
/// Creates the log directory if needed, clears the previous log file, and
/// installs the global subscriber.
///
/// # Arguments
///
/// * `log_file` - Log file path (e.g., `~/.fleetsync/fleetsync.log`)
/// * `console` - Also write human-readable logs to stderr
///
/// # Errors
///
/// Returns error if the log directory cannot be created or the log file
/// cannot be cleared.
pub fn init_logging(log_file: &Path, console: bool) -> Result<LoggingGuard, io::Error> {
    let (log_dir, file_name) = prepare_log_file(log_file)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, &file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_span_events(FmtSpan::CLOSE);

    let console_layer = console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(true)
            .compact()
    });

    // Defaults to INFO if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
        log_file: log_file.to_path_buf(),
    })
}

/// Create the parent directory and truncate the file.
///
/// Returns the directory and file name for the appender.
fn prepare_log_file(log_file: &Path) -> Result<(PathBuf, String), io::Error> {
    let (log_dir, file_name) = split_log_path(log_file)?;
    fs::create_dir_all(&log_dir)?;
    fs::write(log_file, "")?;
    Ok((log_dir, file_name))
}

fn split_log_path(log_file: &Path) -> Result<(PathBuf, String), io::Error> {
    let file_name = log_file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid log file path: {}", log_file.display()),
            )
        })?
        .to_string();

    let log_dir = match log_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok((log_dir, file_name))
}
