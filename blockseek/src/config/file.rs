//! Typed view of the INI configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;
use tracing::debug;

use super::{config_directory, config_file_path, ConfigError, ConfigKey};
use crate::logging::LoggingConfig;
use crate::scan::{ScanConfig, ScanMode, DEFAULT_RELEASE_INTERVAL};
use crate::world::{DirectoryWorldConfig, DEFAULT_CHUNK_CACHE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    /// Where exported match files are written.
    pub directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSettings {
    pub mode: ScanMode,
    pub release_interval: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldSettings {
    pub chunk_cache: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` overrides it.
    pub level: String,
    pub directory: PathBuf,
}

/// All user settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub output: OutputSettings,
    pub scan: ScanSettings,
    pub world: WorldSettings,
    pub logging: LoggingSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let base = config_directory();
        Self {
            output: OutputSettings {
                directory: base.join("results"),
            },
            scan: ScanSettings {
                mode: ScanMode::Palette,
                release_interval: DEFAULT_RELEASE_INTERVAL,
            },
            world: WorldSettings {
                chunk_cache: DEFAULT_CHUNK_CACHE,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                directory: base.join("logs"),
            },
        }
    }
}

impl ConfigFile {
    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
            ini::Error::Parse(err) => ConfigError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        })?;
        Self::from_ini(&ini)
    }

    /// Build settings from parsed INI data, validating each present key.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.section(Some(key.section())).and_then(|s| s.get(key.key_name())) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Every key as INI data.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating its directory.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        self.to_ini().write_to_file(path).map_err(io_error)?;
        debug!(path = %path.display(), "Saved config file");
        Ok(())
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::default()
            .with_mode(self.scan.mode)
            .with_release_interval(self.scan.release_interval)
    }

    pub fn world_config(&self) -> DirectoryWorldConfig {
        DirectoryWorldConfig::default().with_chunk_cache(self.world.chunk_cache)
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::default()
            .with_level(&self.logging.level)
            .with_directory(&self.logging.directory)
    }
}
