//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Mirror every event to the console and a persistent log file
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - The file sink is written through a non-blocking worker; the returned
//!   guard must live until exit or trailing events are lost
//! - The file is appended to, never rotated

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter {level:?}: {reason}")]
    Filter { level: String, reason: String },

    #[error("Log file path has no file name: {0}")]
    FilePath(PathBuf),

    #[error("Failed to open log file: {0}")]
    File(#[from] tracing_appender::rolling::InitError),

    #[error("Failed to install subscriber: {0}")]
    Init(String),
}

/// Install the console and file layers described by `config`.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = build_filter(&config.level)?;

    let (file_layer, guard) = match &config.file_path {
        Some(path) => {
            let appender = open_log_file(path)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = config.console.then(|| fmt::layer());

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(guard)
}

fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| LoggingError::Filter {
            level: level.to_string(),
            reason: e.to_string(),
        })
}

fn open_log_file(path: &Path) -> Result<RollingFileAppender, LoggingError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::FilePath(path.to_path_buf()))?;
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy().into_owned())
        .build(dir)?;
    Ok(appender)
}
