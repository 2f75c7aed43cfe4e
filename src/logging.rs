//! Debug logging sinks.
//!
//! The library only emits `tracing` events. Nothing is recorded unless the host installs a
//! subscriber, either its own or the file-backed one from [`init`]. The terminal being drawn on
//! is never used as a log sink.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;

const DEFAULT_FILTER: &str = "contui=info";

/// Keeps the non-blocking log writer alive. Dropping it flushes pending events.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    log_file: PathBuf,
}

impl LoggingGuard {
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }
}

/// Install a file-backed subscriber when `CONTUI_LOG_FILE` is configured.
///
/// Returns `None` when logging is not configured, the file location is unusable, or another
/// global subscriber is already installed.
pub fn init(config: &EnvConfig) -> Option<LoggingGuard> {
    let log_file = PathBuf::from(config.log_file.as_deref()?);
    let file_name = log_file.file_name()?.to_owned();
    let dir = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).ok()?;

    let appender = tracing_appender::rolling::never(&dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = config
        .log_filter
        .as_deref()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true),
    );

    if subscriber.try_init().is_err() {
        return None;
    }

    tracing::info!(log_file = %log_file.display(), "contui logging initialized");

    Some(LoggingGuard {
        _guard: guard,
        log_file,
    })
}
