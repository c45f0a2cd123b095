//! CLI error type.

use blockseek::block::PatternError;
use blockseek::config::ConfigError;
use blockseek::logging::LoggingError;
use blockseek::scan::ScanError;
use blockseek::translate::TranslateError;
use blockseek::world::WorldError;
use thiserror::Error;

/// Exit code used when the user interrupts a search.
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(String),

    #[error("Configuration error: {0}")]
    ConfigFile(#[from] ConfigError),

    #[error("Invalid block pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("Failed to load mappings: {0}")]
    Mappings(#[from] TranslateError),

    #[error("World error: {0}")]
    World(#[from] WorldError),

    #[error("Search failed: {0}")]
    Search(#[from] ScanError),

    #[error("Logging setup failed: {0}")]
    Logging(#[from] LoggingError),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Search(ScanError::Cancelled { .. }) => EXIT_INTERRUPTED,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_search_exits_as_interrupted() {
        let err = CliError::from(ScanError::Cancelled {
            chunks_done: 3,
            chunks_total: 10,
        });
        assert_eq!(err.exit_code(), EXIT_INTERRUPTED);
        assert_eq!(CliError::Config("bad".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_world_errors_name_the_dimension() {
        let err = CliError::from(WorldError::DimensionNotFound("the_end".to_string()));
        assert!(err.to_string().contains("the_end"));
    }
}
