//! Palette block entries and typed property values.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use super::pattern::{BlockPattern, PropertyMatch, TargetVersion};

/// Namespace assumed when a block name does not carry one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// A property value as typed by a world format.
///
/// Deserializes untagged, so JSON `true`, `3` and `"north"` all map directly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl PropertyValue {
    /// Canonical string form used for every comparison.
    ///
    /// Strings are kept verbatim, integers are rendered in decimal and
    /// booleans as `true`/`false`.
    pub fn canonical(&self) -> String {
        match self {
            PropertyValue::Bool(b) => b.to_string(),
            PropertyValue::Int(i) => i.to_string(),
            PropertyValue::String(s) => s.clone(),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

/// One distinct block variant: namespace, base name and canonical properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockEntry {
    pub namespace: String,
    pub base_name: String,
    pub properties: BTreeMap<String, String>,
}

impl BlockEntry {
    /// Create an entry with no properties.
    pub fn new(namespace: impl Into<String>, base_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            base_name: base_name.into(),
            properties: BTreeMap::new(),
        }
    }

    /// The air block, used to fill freshly allocated volumes.
    pub fn air() -> Self {
        Self::new(DEFAULT_NAMESPACE, "air")
    }

    /// Create an entry from a possibly namespaced name such as `minecraft:stone`.
    pub fn from_name(name: &str) -> Self {
        let (namespace, base_name) = split_name(name);
        Self::new(namespace, base_name)
    }

    /// Create an entry from typed property values, canonicalizing each one.
    pub fn from_typed<I, K>(name: &str, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, PropertyValue)>,
        K: Into<String>,
    {
        let mut entry = Self::from_name(name);
        entry.properties = properties
            .into_iter()
            .map(|(key, value)| (key.into(), value.canonical()))
            .collect();
        entry
    }

    /// Add a property holding an already-canonical value.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// `namespace:base_name`.
    pub fn full_name(&self) -> String {
        format!("{}:{}", self.namespace, self.base_name)
    }

    /// Build a pattern that matches exactly this block variant.
    pub fn to_pattern(&self, target: TargetVersion) -> BlockPattern {
        BlockPattern {
            target,
            namespace: self.namespace.clone(),
            base_name: self.base_name.clone(),
            properties: self
                .properties
                .iter()
                .map(|(key, value)| (key.clone(), PropertyMatch::Exact(value.clone())))
                .collect(),
        }
    }
}

impl fmt::Display for BlockEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())?;
        if !self.properties.is_empty() {
            let props: Vec<String> = self
                .properties
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            write!(f, "[{}]", props.join(","))?;
        }
        Ok(())
    }
}

/// Split `namespace:base` into its parts, defaulting the namespace.
pub(crate) fn split_name(name: &str) -> (&str, &str) {
    match name.split_once(':') {
        Some((namespace, base_name)) => (namespace, base_name),
        None => (DEFAULT_NAMESPACE, name),
    }
}
