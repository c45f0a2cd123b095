//! Log file setup.
//!
//! Installs a global `tracing` subscriber that writes to
//! `<directory>/blockseek.log` through a non-blocking writer. The filter comes
//! from `RUST_LOG` when set, otherwise from the configured level.
//!
//! Keep the returned [`LoggingGuard`] alive until the process exits; dropping
//! it flushes buffered lines.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::config_directory;

/// Name of the log file inside the log directory.
pub const LOG_FILE_NAME: &str = "blockseek.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid log filter '{directive}': {message}")]
    Filter { directive: String, message: String },

    #[error("A global logger is already installed: {0}")]
    AlreadyInitialized(String),
}

/// Where and how verbosely to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: config_directory().join("logs"),
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn with_directory(mut self, directory: impl AsRef<Path>) -> Self {
        self.directory = directory.as_ref().to_path_buf();
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn log_file(&self) -> PathBuf {
        self.directory.join(LOG_FILE_NAME)
    }
}

/// Flushes the log writer when dropped.
pub struct LoggingGuard {
    _worker: WorkerGuard,
}

/// Pick the filter directive: the environment wins over the configured level.
fn build_filter(configured: &str, from_env: Option<&str>) -> Result<EnvFilter, LoggingError> {
    let directive = from_env
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(configured);
    EnvFilter::try_new(directive).map_err(|e| LoggingError::Filter {
        directive: directive.to_string(),
        message: e.to_string(),
    })
}

/// Install the global subscriber.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    fs::create_dir_all(&config.directory).map_err(|source| LoggingError::CreateDir {
        path: config.directory.clone(),
        source,
    })?;

    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(&config.level, from_env.as_deref())?;

    let appender = tracing_appender::rolling::never(&config.directory, LOG_FILE_NAME);
    let (writer, worker) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_timer(LocalTime::rfc_3339()),
        )
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_file = %config.log_file().display(),
        "Logging initialized"
    );

    Ok(LoggingGuard { _worker: worker })
}
