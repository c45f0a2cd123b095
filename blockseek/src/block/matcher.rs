//! The block pattern predicate.

use super::entry::BlockEntry;
use super::pattern::BlockPattern;

/// Test one block entry against a pattern.
///
/// Returns true when the base names are equal and every property the
/// **entry** carries is either unconstrained by the pattern, wildcarded, or
/// constrained to exactly the entry's canonical value.
///
/// Matching is driven by the entry's properties: a pattern constraint on a
/// property the entry does not have is never checked. The namespace is not
/// compared.
#[inline]
pub fn matches(entry: &BlockEntry, pattern: &BlockPattern) -> bool {
    entry.base_name == pattern.base_name
        && entry.properties.iter().all(|(key, value)| {
            pattern
                .properties
                .get(key)
                .map_or(true, |constraint| constraint.accepts(value))
        })
}
