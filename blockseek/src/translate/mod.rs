//! Translation of universal block entries into a target version.
//!
//! World sources hand out palette entries in a version-independent
//! ("universal") form. Before an entry is tested against a pattern it is
//! translated into the pattern's [`TargetVersion`] through a [`Translator`].
//!
//! A missing mapping is always an error, never an empty result: silently
//! skipping an entry would turn into false negatives in the search output.

mod mapping;

pub use mapping::MappingTranslator;

use std::path::PathBuf;

use thiserror::Error;

use crate::block::{BlockEntry, TargetVersion};

/// Errors raised by translators.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// No tables exist for the requested platform and version.
    #[error("No translation available for {platform} {version}")]
    UnsupportedTarget { platform: String, version: u32 },

    /// The tables exist but have no entry for this block.
    #[error("No mapping for {block} in {platform} {version}")]
    UnmappedBlock {
        block: String,
        platform: String,
        version: u32,
    },

    /// Mapping file could not be read.
    #[error("Failed to read mapping file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Mapping file is not valid mapping JSON.
    #[error("Invalid mapping file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl TranslateError {
    fn unsupported(target: &TargetVersion) -> Self {
        TranslateError::UnsupportedTarget {
            platform: target.platform.clone(),
            version: target.version,
        }
    }
}

/// Converts a universal block entry into a target version representation.
///
/// Implementations must be deterministic: the same entry and target always
/// produce the same result.
pub trait Translator {
    fn translate(
        &self,
        entry: &BlockEntry,
        target: &TargetVersion,
    ) -> Result<BlockEntry, TranslateError>;
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn translate(
        &self,
        entry: &BlockEntry,
        target: &TargetVersion,
    ) -> Result<BlockEntry, TranslateError> {
        (**self).translate(entry, target)
    }
}

/// Translator for patterns written against the universal representation.
///
/// Returns entries unchanged for the `universal` platform and refuses every
/// other target.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranslator;

impl Translator for PassthroughTranslator {
    fn translate(
        &self,
        entry: &BlockEntry,
        target: &TargetVersion,
    ) -> Result<BlockEntry, TranslateError> {
        if target.is_universal() {
            Ok(entry.clone())
        } else {
            Err(TranslateError::unsupported(target))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_universal() {
        let entry = BlockEntry::from_name("stone").with_property("variant", "granite");
        let translated = PassthroughTranslator
            .translate(&entry, &TargetVersion::universal())
            .unwrap();
        assert_eq!(translated, entry);
    }

    #[test]
    fn test_passthrough_rejects_other_platforms() {
        let entry = BlockEntry::from_name("stone");
        let err = PassthroughTranslator
            .translate(&entry, &TargetVersion::new("bedrock", 11620))
            .unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedTarget { .. }));
        assert_eq!(err.to_string(), "No translation available for bedrock 11620");
    }

    #[test]
    fn test_boxed_translator() {
        let boxed: Box<dyn Translator> = Box::new(PassthroughTranslator);
        let entry = BlockEntry::from_name("dirt");
        assert_eq!(
            boxed.translate(&entry, &TargetVersion::universal()).unwrap(),
            entry
        );
    }
}
