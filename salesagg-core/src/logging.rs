//! Logging setup.
//!
//! The subscriber is installed as the *scoped* default for the calling thread
//! and lives exactly as long as the returned [`LogGuard`]. Human-readable lines
//! go to stderr; when a log directory is given, JSON lines also go to a daily
//! rolling file.

use std::path::Path;
use tracing::subscriber::DefaultGuard;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// File name prefix for rolling JSON logs.
pub const LOG_FILE_PREFIX: &str = "salesagg.log";

/// Keeps the logging context alive. Dropping it flushes and uninstalls it.
#[must_use = "logging stops when the guard is dropped"]
pub struct LogGuard {
    _default: DefaultGuard,
    _file: Option<WorkerGuard>,
}

impl std::fmt::Debug for LogGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogGuard")
            .field("file_logging", &self._file.is_some())
            .finish()
    }
}

/// Map `-v`/`-q` flags to a filter directive.
pub fn level_filter(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the logging context. `RUST_LOG`, when set, replaces `filter` for stderr.
pub fn init(filter: &str, log_dir: Option<&Path>) -> LogGuard {
    let stderr_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(stderr_filter);

    let mut file_guard = None;
    let json_layer = log_dir.and_then(|dir| {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Cannot create log directory {}: {e}", dir.display());
            return None;
        }
        let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        file_guard = Some(guard);
        Some(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new("debug")),
        )
    });

    let default = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .set_default();

    LogGuard {
        _default: default,
        _file: file_guard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        assert_eq!(level_filter(0, false), "info");
        assert_eq!(level_filter(0, true), "error");
        assert_eq!(level_filter(1, true), "debug");
        assert_eq!(level_filter(3, false), "trace");
    }

    #[test]
    fn test_file_logging_writes_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        {
            let guard = init("info", Some(&logs));
            tracing::info!(run = 1, "file logging check");
            drop(guard);
        }
        let files: Vec<_> = std::fs::read_dir(&logs).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_guard_without_file() {
        let guard = init("warn", None);
        assert!(format!("{guard:?}").contains("file_logging: false"));
    }
}
