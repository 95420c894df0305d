//! Tracing setup: stderr always, plus an optional rolling log file.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::config::{AppConfig, LogRotation};

/// Build the filter: `RUST_LOG` wins, then `level`.
///
/// Python-style names such as `WARNING` are accepted.
pub fn env_filter(level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = match level.to_ascii_lowercase().as_str() {
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        other => other.to_string(),
    };
    EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer and must be kept alive.
pub fn init(config: &AppConfig, level: &str) -> anyhow::Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match &config.log_file {
        Some(log_file) => {
            let path = Path::new(log_file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let prefix = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("image-api.log");

            let appender = RollingFileAppender::builder()
                .rotation(rotation(config.log_rotation))
                .filename_prefix(prefix)
                .max_log_files(config.log_max_files.max(1))
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

fn rotation(rotation: LogRotation) -> Rotation {
    match rotation {
        LogRotation::Minutely => Rotation::MINUTELY,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    }
}
