//! User configuration stored in `~/.blockseek/config.ini`.
//!
//! ```ini
//! [output]
//! directory = ~/.blockseek/results
//!
//! [scan]
//! mode = palette
//! release_interval = 256
//!
//! [world]
//! chunk_cache = 1024
//!
//! [logging]
//! level = info
//! directory = ~/.blockseek/logs
//! ```
//!
//! A missing file or a missing key falls back to the default. Paths may start
//! with `~`, which expands to the home directory.

mod file;
mod keys;

pub use file::{ConfigFile, LoggingSettings, OutputSettings, ScanSettings, WorldSettings};
pub use keys::ConfigKey;

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while loading, saving or editing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Directory holding the config file, results and logs.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".blockseek")
}

/// Location of `config.ini`.
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(value: &str) -> PathBuf {
    let home = || dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    if value == "~" {
        home()
    } else if let Some(rest) = value.strip_prefix("~/") {
        home().join(rest)
    } else {
        PathBuf::from(value)
    }
}

/// Render a path with the home directory collapsed back to `~`.
pub fn collapse_tilde(path: &Path) -> String {
    match dirs::home_dir().and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf)) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(rest) => format!("~/{}", rest.display()),
        None => path.display().to_string(),
    }
}
