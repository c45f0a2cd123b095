//! Table-driven translation loaded from a JSON mapping file.
//!
//! # File format
//!
//! ```json
//! {
//!   "tables": [
//!     {
//!       "platform": "bedrock",
//!       "version": 11620,
//!       "blockstate": false,
//!       "blocks": {
//!         "minecraft:wool": {
//!           "name": "minecraft:wool",
//!           "rename": { "color": "color" },
//!           "drop": ["waterlogged"],
//!           "fixed": { "legacy": true }
//!         }
//!       }
//!     }
//!   ]
//! }
//! ```
//!
//! Tables are keyed by platform, version and the `blockstate` flag. A target
//! with `force_blockstate` set prefers a `"blockstate": true` table and falls
//! back to the plain table for the same platform and version (and the reverse
//! for targets without the flag).

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::{TranslateError, Translator};
use crate::block::{split_name, BlockEntry, PropertyValue, TargetVersion};

#[derive(Debug, Deserialize)]
struct MappingFile {
    tables: Vec<TableFile>,
}

#[derive(Debug, Deserialize)]
struct TableFile {
    platform: String,
    version: u32,
    #[serde(default)]
    blockstate: bool,
    blocks: BTreeMap<String, BlockMapping>,
}

/// How one universal block is written in the target version.
#[derive(Debug, Clone, Deserialize)]
struct BlockMapping {
    /// Target `namespace:base_name`.
    name: String,
    /// Universal property key -> target property key.
    #[serde(default)]
    rename: BTreeMap<String, String>,
    /// Universal properties the target does not have.
    #[serde(default)]
    drop: Vec<String>,
    /// Properties the target always carries.
    #[serde(default)]
    fixed: BTreeMap<String, PropertyValue>,
}

type TableKey = (String, u32, bool);

/// Translator backed by per-version mapping tables.
#[derive(Debug, Default)]
pub struct MappingTranslator {
    tables: HashMap<TableKey, HashMap<String, BlockMapping>>,
}

impl MappingTranslator {
    /// Load tables from a JSON mapping file.
    pub fn from_file(path: &Path) -> Result<Self, TranslateError> {
        let json = fs::read_to_string(path).map_err(|source| TranslateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let translator = Self::from_json(&json).map_err(|source| TranslateError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            path = %path.display(),
            tables = translator.table_count(),
            "Loaded mapping tables"
        );
        Ok(translator)
    }

    /// Parse tables from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: MappingFile = serde_json::from_str(json)?;
        let mut tables: HashMap<TableKey, HashMap<String, BlockMapping>> = HashMap::new();

        for table in file.tables {
            let blocks = tables
                .entry((table.platform, table.version, table.blockstate))
                .or_default();
            for (name, mapping) in table.blocks {
                let (namespace, base_name) = split_name(&name);
                blocks.insert(format!("{}:{}", namespace, base_name), mapping);
            }
        }

        Ok(Self { tables })
    }

    /// Number of distinct (platform, version, blockstate) tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    fn table(&self, target: &TargetVersion) -> Option<&HashMap<String, BlockMapping>> {
        let key = |blockstate| (target.platform.clone(), target.version, blockstate);
        self.tables
            .get(&key(target.force_blockstate))
            .or_else(|| self.tables.get(&key(!target.force_blockstate)))
    }
}

impl Translator for MappingTranslator {
    fn translate(
        &self,
        entry: &BlockEntry,
        target: &TargetVersion,
    ) -> Result<BlockEntry, TranslateError> {
        let Some(table) = self.table(target) else {
            if target.is_universal() {
                return Ok(entry.clone());
            }
            return Err(TranslateError::unsupported(target));
        };

        let mapping = table
            .get(&entry.full_name())
            .ok_or_else(|| TranslateError::UnmappedBlock {
                block: entry.full_name(),
                platform: target.platform.clone(),
                version: target.version,
            })?;

        let mut translated = BlockEntry::from_name(&mapping.name);
        for (key, value) in &entry.properties {
            if mapping.drop.contains(key) {
                continue;
            }
            let key = mapping.rename.get(key).unwrap_or(key);
            translated.properties.insert(key.clone(), value.clone());
        }
        for (key, value) in &mapping.fixed {
            translated.properties.insert(key.clone(), value.canonical());
        }

        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TABLES: &str = r#"{
        "tables": [
            {
                "platform": "bedrock",
                "version": 11620,
                "blocks": {
                    "minecraft:wool": { "name": "minecraft:wool" },
                    "stone": {
                        "name": "minecraft:stone",
                        "rename": { "variant": "stone_type" },
                        "drop": ["waterlogged"],
                        "fixed": { "legacy": true }
                    }
                }
            },
            {
                "platform": "bedrock",
                "version": 11620,
                "blockstate": true,
                "blocks": {
                    "minecraft:wool": { "name": "minecraft:white_wool_state" }
                }
            }
        ]
    }"#;

    fn translator() -> MappingTranslator {
        MappingTranslator::from_json(TABLES).unwrap()
    }

    #[test]
    fn test_table_count() {
        assert_eq!(translator().table_count(), 2);
    }

    #[test]
    fn test_renames_drops_and_fixes() {
        let entry = BlockEntry::from_name("stone")
            .with_property("variant", "granite")
            .with_property("waterlogged", "false");
        let translated = translator()
            .translate(&entry, &TargetVersion::new("bedrock", 11620))
            .unwrap();

        assert_eq!(translated.base_name, "stone");
        assert_eq!(translated.properties.get("stone_type").map(String::as_str), Some("granite"));
        assert_eq!(translated.properties.get("legacy").map(String::as_str), Some("true"));
        assert!(!translated.properties.contains_key("waterlogged"));
        assert!(!translated.properties.contains_key("variant"));
    }

    #[test]
    fn test_force_blockstate_selects_table() {
        let entry = BlockEntry::from_name("wool").with_property("color", "red");
        let plain = translator()
            .translate(&entry, &TargetVersion::new("bedrock", 11620))
            .unwrap();
        let forced = translator()
            .translate(
                &entry,
                &TargetVersion::new("bedrock", 11620).with_force_blockstate(true),
            )
            .unwrap();

        assert_eq!(plain.base_name, "wool");
        assert_eq!(forced.base_name, "white_wool_state");
    }

    #[test]
    fn test_blockstate_table_is_not_merged_with_plain_table() {
        let entry = BlockEntry::from_name("stone");
        let translated = translator()
            .translate(
                &entry,
                &TargetVersion::new("bedrock", 11620).with_force_blockstate(true),
            )
            .map(|e| e.base_name);
        // fallback picks a whole table, never individual blocks
        assert!(matches!(
            translated,
            Err(TranslateError::UnmappedBlock { .. })
        ));
    }

    #[test]
    fn test_missing_table_is_error() {
        let err = translator()
            .translate(&BlockEntry::from_name("stone"), &TargetVersion::new("java", 3465))
            .unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedTarget { .. }));
    }

    #[test]
    fn test_missing_block_is_error() {
        let err = translator()
            .translate(&BlockEntry::from_name("beacon"), &TargetVersion::new("bedrock", 11620))
            .unwrap_err();
        assert_eq!(err.to_string(), "No mapping for minecraft:beacon in bedrock 11620");
    }

    #[test]
    fn test_universal_without_table_passes_through() {
        let entry = BlockEntry::from_name("beacon");
        let translated = translator()
            .translate(&entry, &TargetVersion::universal())
            .unwrap();
        assert_eq!(translated, entry);
    }

    #[test]
    fn test_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tables.json");
        std::fs::write(&path, TABLES).unwrap();

        let translator = MappingTranslator::from_file(&path).unwrap();
        assert_eq!(translator.table_count(), 2);
    }

    #[test]
    fn test_from_file_errors() {
        let temp = TempDir::new().unwrap();

        let missing = MappingTranslator::from_file(&temp.path().join("none.json")).unwrap_err();
        assert!(matches!(missing, TranslateError::Io { .. }));

        let path = temp.path().join("broken.json");
        std::fs::write(&path, "{ \"tables\": 3 }").unwrap();
        let broken = MappingTranslator::from_file(&path).unwrap_err();
        assert!(matches!(broken, TranslateError::Parse { .. }));
    }
}
