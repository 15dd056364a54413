use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Daily-rotated log files named after `path`, e.g. `logs/app.log` gives
/// `logs/app.2026-10-14.log`. Only the newest `retention_days` files are kept.
pub fn rolling_appender(path: &Path, retention_days: usize) -> Result<RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let prefix = path.file_stem().and_then(|s| s.to_str()).unwrap_or("app");
    let mut builder = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .max_log_files(retention_days.max(1));
    if let Some(suffix) = path.extension().and_then(|s| s.to_str()) {
        builder = builder.filename_suffix(suffix);
    }
    builder
        .build(dir)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

/// Console logging, plus an uncolored copy in rotated files when `log_file` is given.
///
/// `RUST_LOG` overrides `level`. Keep the returned guard alive until exit so
/// buffered file lines are flushed.
pub fn init(level: &str, log_file: Option<&Path>, retention_days: usize) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log level '{level}'"))?;

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(rolling_appender(path, retention_days)?);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init()
        .context("Logger already initialized")?;

    Ok(guard)
}
