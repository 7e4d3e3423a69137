//! Logging setup.
//!
//! Logs go to stdout and, when a log file is configured, to that file through
//! a non-blocking writer. The returned guard must be held for the lifetime of
//! the process so buffered file output is flushed on exit.

use std::path::Path;
use time::{format_description::well_known::Rfc3339, UtcOffset};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, fmt::time::OffsetTime, prelude::*, EnvFilter};

/// Build the log filter.
///
/// An explicit level takes precedence over `RUST_LOG`; the default is `info`.
pub fn build_filter(log_level: Option<&str>) -> anyhow::Result<EnvFilter> {
    match log_level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", level, e)),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))),
    }
}

/// Initialize the global tracing subscriber.
pub fn init(log_level: Option<&str>, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = build_filter(log_level)?;

    // Must be resolved before the runtime spawns threads.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(offset, Rfc3339);

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_timer(timer.clone())
        .compact();

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_timer(timer)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    if let Some(path) = log_file {
        tracing::info!("Logging to file: {}", path.display());
    }

    Ok(guard)
}

fn file_writer(
    path: &Path,
) -> anyhow::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Log file path has no file name: {}", path.display()))?;
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory)?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    Ok(tracing_appender::non_blocking(appender))
}
