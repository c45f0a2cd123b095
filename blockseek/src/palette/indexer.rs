//! Incremental classification of palette entries against a pattern.

use thiserror::Error;
use tracing::trace;

use super::Palette;
use crate::block::{BlockEntry, BlockPattern};
use crate::translate::{TranslateError, Translator};

/// A palette entry could not be translated into the pattern's target version.
#[derive(Debug, Error)]
#[error("Failed to translate palette entry {palette_id} ({block}): {source}")]
pub struct ClassifyError {
    pub palette_id: u32,
    pub block: BlockEntry,
    #[source]
    pub source: TranslateError,
}

/// Which ids of one palette scope satisfy the pattern.
///
/// Holds one flag per classified id, so the high-water mark of classified
/// entries (`palette_cursor`) is the table length. The table only grows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaletteClassification {
    lookup: Vec<bool>,
    match_count: usize,
}

impl PaletteClassification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of palette entries already classified.
    pub fn palette_cursor(&self) -> usize {
        self.lookup.len()
    }

    /// Whether `id` is known to match.
    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        self.lookup.get(id as usize).copied().unwrap_or(false)
    }

    /// Matching ids in ascending order.
    pub fn match_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.lookup
            .iter()
            .enumerate()
            .filter(|&(_, &hit)| hit)
            .map(|(id, _)| id as u32)
    }

    pub fn match_count(&self) -> usize {
        self.match_count
    }

    pub fn has_matches(&self) -> bool {
        self.match_count > 0
    }

    /// Membership table indexed by palette id.
    pub fn lookup_table(&self) -> &[bool] {
        &self.lookup
    }
}

/// Classifies palette entries for one pattern, translating each entry into
/// the pattern's target version first.
pub struct PaletteIndexer<'a, T: Translator + ?Sized> {
    pattern: &'a BlockPattern,
    translator: &'a T,
}

impl<'a, T: Translator + ?Sized> PaletteIndexer<'a, T> {
    pub fn new(pattern: &'a BlockPattern, translator: &'a T) -> Self {
        Self {
            pattern,
            translator,
        }
    }

    /// Translate one entry and test it against the pattern.
    pub fn classify(&self, palette_id: u32, entry: &BlockEntry) -> Result<bool, ClassifyError> {
        let translated = self
            .translator
            .translate(entry, &self.pattern.target)
            .map_err(|source| ClassifyError {
                palette_id,
                block: entry.clone(),
                source,
            })?;
        Ok(self.pattern.matches(&translated))
    }

    /// Classify every entry appended to `palette` since the last call.
    ///
    /// Does nothing when the palette has not grown past the cursor. On a
    /// translation failure `state` is left exactly as it was.
    ///
    /// Returns the number of newly classified entries.
    pub fn advance(
        &self,
        state: &mut PaletteClassification,
        palette: &Palette,
    ) -> Result<usize, ClassifyError> {
        let cursor = state.palette_cursor();
        if palette.len() <= cursor {
            return Ok(0);
        }

        let fresh = &palette.entries()[cursor..];
        let mut flags = Vec::with_capacity(fresh.len());
        for (offset, entry) in fresh.iter().enumerate() {
            flags.push(self.classify((cursor + offset) as u32, entry)?);
        }

        let hits = flags.iter().filter(|&&hit| hit).count();
        state.lookup.extend(flags);
        state.match_count += hits;

        trace!(
            classified = fresh.len(),
            hits,
            palette_cursor = state.palette_cursor(),
            "Advanced palette classification"
        );

        Ok(fresh.len())
    }
}
