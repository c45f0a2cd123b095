//! Block search patterns and their text syntax.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use super::entry::{split_name, BlockEntry, DEFAULT_NAMESPACE};

/// Pattern property value meaning "any value of this property".
pub const WILDCARD: &str = "*";

/// Errors raised while building or validating a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The pattern does not name a block.
    #[error("Block pattern has an empty base name")]
    EmptyBaseName,

    /// A property constraint has no key.
    #[error("Block pattern has a property with an empty key")]
    EmptyPropertyKey,

    /// The same property key is constrained twice.
    #[error("Property '{0}' is constrained more than once")]
    DuplicateProperty(String),

    /// The target platform is empty.
    #[error("Block pattern has an empty target platform")]
    EmptyPlatform,

    /// The text does not follow `[namespace:]name[key=value,...]`.
    #[error("Invalid block pattern '{text}': {reason}")]
    Syntax { text: String, reason: String },
}

/// Constraint on a single property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyMatch {
    /// Any value is accepted.
    Any,
    /// Only this canonical value is accepted.
    Exact(String),
}

impl PropertyMatch {
    /// Parse a value, treating `*` as the wildcard.
    pub fn parse(value: &str) -> Self {
        if value == WILDCARD {
            PropertyMatch::Any
        } else {
            PropertyMatch::Exact(value.to_string())
        }
    }

    /// Whether the canonical `value` satisfies this constraint.
    #[inline]
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            PropertyMatch::Any => true,
            PropertyMatch::Exact(expected) => expected == value,
        }
    }
}

impl fmt::Display for PropertyMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyMatch::Any => f.write_str(WILDCARD),
            PropertyMatch::Exact(value) => f.write_str(value),
        }
    }
}

/// Version representation palette entries are translated into before matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetVersion {
    pub platform: String,
    pub version: u32,
    pub force_blockstate: bool,
}

impl TargetVersion {
    /// Platform name of the version-independent representation.
    pub const UNIVERSAL_PLATFORM: &'static str = "universal";

    pub fn new(platform: impl Into<String>, version: u32) -> Self {
        Self {
            platform: platform.into(),
            version,
            force_blockstate: false,
        }
    }

    /// The version-independent representation (no translation needed).
    pub fn universal() -> Self {
        Self::new(Self::UNIVERSAL_PLATFORM, 0)
    }

    pub fn with_force_blockstate(mut self, force: bool) -> Self {
        self.force_blockstate = force;
        self
    }

    pub fn is_universal(&self) -> bool {
        self.platform == Self::UNIVERSAL_PLATFORM
    }
}

impl fmt::Display for TargetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.platform, self.version)?;
        if self.force_blockstate {
            write!(f, " (blockstate)")?;
        }
        Ok(())
    }
}

/// What to search for: a block type in a target version, with per-property
/// exact values or wildcards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPattern {
    pub target: TargetVersion,
    pub namespace: String,
    pub base_name: String,
    pub properties: BTreeMap<String, PropertyMatch>,
}

/// `[namespace:]name[props]`; namespace and name may not contain `:`, `[` or `]`.
fn pattern_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([^:\[\]]*:)?([^:\[\]]*)(?:\[([^\[\]]*)\])?$").unwrap())
}

impl BlockPattern {
    /// Create a pattern with no property constraints.
    pub fn new(
        target: TargetVersion,
        namespace: impl Into<String>,
        base_name: impl Into<String>,
    ) -> Self {
        Self {
            target,
            namespace: namespace.into(),
            base_name: base_name.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Create a pattern from a possibly namespaced name such as `minecraft:stone`.
    pub fn named(target: TargetVersion, name: &str) -> Self {
        let (namespace, base_name) = split_name(name);
        Self::new(target, namespace, base_name)
    }

    /// Constrain a property to an exact canonical value.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .insert(key.into(), PropertyMatch::Exact(value.into()));
        self
    }

    /// Accept any value for a property.
    pub fn with_wildcard(mut self, key: impl Into<String>) -> Self {
        self.properties.insert(key.into(), PropertyMatch::Any);
        self
    }

    /// Parse `[namespace:]base_name[key=value,key=*]` for the given target.
    ///
    /// The result is validated before it is returned.
    pub fn parse(text: &str, target: TargetVersion) -> Result<Self, PatternError> {
        let syntax = |reason: &str| PatternError::Syntax {
            text: text.to_string(),
            reason: reason.to_string(),
        };

        let captures = pattern_regex()
            .captures(text.trim())
            .ok_or_else(|| syntax("expected [namespace:]name[key=value,...]"))?;

        let namespace = captures
            .get(1)
            .map(|m| m.as_str().trim_end_matches(':').trim())
            .unwrap_or(DEFAULT_NAMESPACE);
        let base_name = captures.get(2).map(|m| m.as_str().trim()).unwrap_or("");

        let mut pattern = Self::new(target, namespace, base_name);

        if let Some(props) = captures.get(3) {
            for part in props.as_str().split(',').map(str::trim) {
                if part.is_empty() {
                    continue;
                }
                let (key, value) = part
                    .split_once('=')
                    .ok_or_else(|| syntax("property constraints must be key=value"))?;
                let (key, value) = (key.trim(), value.trim());
                if value.is_empty() {
                    return Err(syntax("property value is empty"));
                }
                if pattern.properties.contains_key(key) {
                    return Err(PatternError::DuplicateProperty(key.to_string()));
                }
                pattern
                    .properties
                    .insert(key.to_string(), PropertyMatch::parse(value));
            }
        }

        pattern.validate()?;
        Ok(pattern)
    }

    /// Reject malformed patterns before a scan starts.
    pub fn validate(&self) -> Result<(), PatternError> {
        if self.base_name.trim().is_empty() {
            return Err(PatternError::EmptyBaseName);
        }
        if self.target.platform.trim().is_empty() {
            return Err(PatternError::EmptyPlatform);
        }
        if self.properties.keys().any(|key| key.trim().is_empty()) {
            return Err(PatternError::EmptyPropertyKey);
        }
        Ok(())
    }

    /// Test a (translated) entry against this pattern.
    #[inline]
    pub fn matches(&self, entry: &BlockEntry) -> bool {
        super::matcher::matches(entry, self)
    }

    /// `namespace:base_name`.
    pub fn full_name(&self) -> String {
        format!("{}:{}", self.namespace, self.base_name)
    }
}

impl fmt::Display for BlockPattern {
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
