//! Application logging
//!
//! Installs the tracing subscriber: a stderr layer always, plus a dated log
//! file under ~/.config/matra-variants/logs when file logging is on.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Get the path to the logs directory
pub fn logs_dir() -> PathBuf {
    crate::core::config_file::ConfigFile::config_dir().join("logs")
}

/// Name of today's log file
pub fn log_file_name() -> String {
    let timestamp = chrono::Local::now().format("%Y-%m-%d");
    format!("matra-variants-{}.log", timestamp)
}

/// Get the path to the current log file
pub fn current_log_file() -> PathBuf {
    logs_dir().join(log_file_name())
}

/// Initialize the logs directory
pub fn initialize_logs_directory() -> Result<PathBuf> {
    let logs_dir = logs_dir();
    fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create logs directory {}", logs_dir.display()))?;
    Ok(logs_dir)
}

/// Filter from RUST_LOG when set, otherwise `fallback`
fn env_filter(fallback: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(fallback)
            .with_context(|| format!("Invalid log filter '{fallback}'")),
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must live until
/// the program exits.
pub fn init(filter: &str, log_to_file: bool) -> Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = if log_to_file {
        let dir = initialize_logs_directory()?;
        let appender = tracing_appender::rolling::never(dir, log_file_name());
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_writer(writer).with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter(filter)?)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install the log subscriber")?;

    if guard.is_some() {
        tracing::debug!("Logging to {}", current_log_file().display());
    }
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_is_dated() {
        let name = log_file_name();
        assert!(name.starts_with("matra-variants-"));
        assert!(name.ends_with(".log"));
        assert_eq!(name.len(), "matra-variants-YYYY-MM-DD.log".len());
        assert!(current_log_file().starts_with(logs_dir()));
    }

    #[test]
    fn filters_parse() {
        assert!(env_filter("debug").is_ok());
        assert!(env_filter("matra_variants=trace,warn").is_ok());
    }
}
