//! Block entries, search patterns and the pattern matcher.
//!
//! A [`BlockEntry`] is one distinct block variant as it appears in a palette:
//! a namespaced base name plus a property map. Property values are always held
//! in canonical string form (see [`PropertyValue::canonical`]) so matching never
//! has to know how a world format typed them.
//!
//! A [`BlockPattern`] describes what to search for. Each pattern property is
//! either an exact canonical value or the wildcard `*`.
//!
//! # Pattern syntax
//!
//! ```text
//! [namespace:]base_name[key=value,key=*]
//! ```
//!
//! ```
//! use blockseek::block::{BlockEntry, BlockPattern, TargetVersion};
//!
//! let pattern = BlockPattern::parse("minecraft:wool[color=*]", TargetVersion::universal()).unwrap();
//! let red = BlockEntry::new("minecraft", "wool").with_property("color", "red");
//!
//! assert!(pattern.matches(&red));
//! ```

mod entry;
mod matcher;
mod pattern;

pub use entry::{BlockEntry, PropertyValue, DEFAULT_NAMESPACE};
pub(crate) use entry::split_name;
pub use matcher::matches;
pub use pattern::{BlockPattern, PatternError, PropertyMatch, TargetVersion, WILDCARD};
