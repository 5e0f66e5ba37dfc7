use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "notes-tui.log";

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Daily rolling file; the TUI owns the terminal.
    File,
    /// Stderr; `serve` mode keeps stdout for replies.
    Stderr,
}

/// Keeps the background writer alive. Dropping it flushes pending lines.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Platform log directory, or one under the temp dir if that cannot be made.
fn ensure_log_dir() -> Option<PathBuf> {
    let preferred = dirs::data_local_dir().map(|d| d.join("notes-tui").join("logs"));
    if let Some(dir) = preferred {
        if std::fs::create_dir_all(&dir).is_ok() {
            return Some(dir);
        }
    }
    let fallback = std::env::temp_dir().join("notes-tui").join("logs");
    std::fs::create_dir_all(&fallback).ok()?;
    Some(fallback)
}

/// `RUST_LOG` wins when it parses; otherwise the configured directive.
fn build_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER))
}

/// Install the global subscriber. `None` if one is already set or no log
/// directory could be made; the app runs without logs in that case.
pub fn init(filter: &str, target: LogTarget) -> Option<LoggingGuard> {
    let (writer, guard, log_dir) = match target {
        LogTarget::File => {
            let log_dir = ensure_log_dir()?;
            let appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (writer, guard, Some(log_dir))
        }
        LogTarget::Stderr => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
            (writer, guard, None)
        }
    };

    let subscriber = tracing_subscriber::registry().with(build_filter(filter)).with(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true),
    );

    if subscriber.try_init().is_err() {
        return None;
    }

    match &log_dir {
        Some(dir) => tracing::info!(log_dir = %dir.display(), "tracing initialized"),
        None => tracing::info!("tracing initialized on stderr"),
    }

    Some(LoggingGuard {
        _guard: guard,
        log_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_dir_exists_after_ensure() {
        let dir = ensure_log_dir().expect("some log dir");
        assert!(dir.is_dir());
        assert!(dir.ends_with(Path::new("notes-tui").join("logs")));
    }

    #[test]
    fn bad_directive_still_yields_a_filter() {
        // Must not panic on garbage.
        let _ = build_filter("notes_tui=[[[");
    }
}
