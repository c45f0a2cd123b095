//! Addressable configuration keys for `config get` / `config set`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use super::{collapse_tilde, expand_tilde, ConfigError, ConfigFile};
use crate::scan::ScanMode;

/// One `section.key` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    OutputDirectory,
    ScanMode,
    ScanReleaseInterval,
    WorldChunkCache,
    LoggingLevel,
    LoggingDirectory,
}

impl ConfigKey {
    /// Every key, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::OutputDirectory,
            ConfigKey::ScanMode,
            ConfigKey::ScanReleaseInterval,
            ConfigKey::WorldChunkCache,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingDirectory,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::OutputDirectory => "output",
            ConfigKey::ScanMode | ConfigKey::ScanReleaseInterval => "scan",
            ConfigKey::WorldChunkCache => "world",
            ConfigKey::LoggingLevel | ConfigKey::LoggingDirectory => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::OutputDirectory | ConfigKey::LoggingDirectory => "directory",
            ConfigKey::ScanMode => "mode",
            ConfigKey::ScanReleaseInterval => "release_interval",
            ConfigKey::WorldChunkCache => "chunk_cache",
            ConfigKey::LoggingLevel => "level",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value rendered as it would be written to the file.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::OutputDirectory => collapse_tilde(&config.output.directory),
            ConfigKey::ScanMode => config.scan.mode.to_string(),
            ConfigKey::ScanReleaseInterval => config.scan.release_interval.to_string(),
            ConfigKey::WorldChunkCache => config.world.chunk_cache.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => collapse_tilde(&config.logging.directory),
        }
    }

    /// Validate `value` and store it.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let trimmed = value.trim();
        match self {
            ConfigKey::OutputDirectory => config.output.directory = self.parse_path(value)?,
            ConfigKey::ScanMode => {
                config.scan.mode = trimmed
                    .parse::<ScanMode>()
                    .map_err(|reason| self.invalid(value, &reason))?;
            }
            ConfigKey::ScanReleaseInterval => {
                config.scan.release_interval = trimmed
                    .parse()
                    .map_err(|_| self.invalid(value, "expected a whole number of chunks"))?;
            }
            ConfigKey::WorldChunkCache => {
                let capacity: u64 = trimmed
                    .parse()
                    .map_err(|_| self.invalid(value, "expected a whole number of chunks"))?;
                if capacity == 0 {
                    return Err(self.invalid(value, "cache must hold at least one chunk"));
                }
                config.world.chunk_cache = capacity;
            }
            ConfigKey::LoggingLevel => {
                EnvFilter::try_new(trimmed).map_err(|e| self.invalid(value, &e.to_string()))?;
                config.logging.level = trimmed.to_string();
            }
            ConfigKey::LoggingDirectory => config.logging.directory = self.parse_path(value)?,
        }
        Ok(())
    }

    fn parse_path(&self, value: &str) -> Result<PathBuf, ConfigError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(self.invalid(value, "path must not be empty"));
        }
        Ok(expand_tilde(trimmed))
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
