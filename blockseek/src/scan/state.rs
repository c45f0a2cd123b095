//! Mutable state owned by a single search.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use super::{BlockMatch, ScanProgress};
use crate::palette::{ClassifyError, PaletteClassification, PaletteIndexer, PaletteScope};
use crate::translate::Translator;
use crate::world::Chunk;

/// Classification progress, accumulated matches and chunk counters.
///
/// World- and dimension-scoped palettes keep their classification for the
/// whole search. A chunk-scoped palette is classified into a scratch table
/// that is reset for every chunk, since its ids mean something else in the
/// next chunk.
#[derive(Debug, Default)]
pub struct ScanState {
    shared: HashMap<PaletteScope, PaletteClassification>,
    scratch: PaletteClassification,
    matches: Vec<BlockMatch>,
    chunks_done: usize,
    chunks_total: usize,
}

impl ScanState {
    pub fn new(chunks_total: usize) -> Self {
        Self {
            chunks_total,
            ..Self::default()
        }
    }

    /// Classification kept for a shared palette scope, if any chunk used it.
    pub fn classification(&self, scope: &PaletteScope) -> Option<&PaletteClassification> {
        self.shared.get(scope)
    }

    pub fn matches(&self) -> &[BlockMatch] {
        &self.matches
    }

    pub fn into_matches(self) -> Vec<BlockMatch> {
        self.matches
    }

    pub fn chunks_done(&self) -> usize {
        self.chunks_done
    }

    pub fn chunks_total(&self) -> usize {
        self.chunks_total
    }

    pub fn progress(&self) -> ScanProgress {
        ScanProgress {
            chunks_done: self.chunks_done,
            chunks_total: self.chunks_total,
        }
    }

    pub(crate) fn finish_chunk(&mut self) {
        if self.chunks_done < self.chunks_total {
            self.chunks_done += 1;
        }
    }

    /// Bring the chunk palette's classification up to date, then collect
    /// every voxel whose id matches in one pass over the volume.
    pub(crate) fn collect_indexed<T: Translator + ?Sized>(
        &mut self,
        indexer: &PaletteIndexer<'_, T>,
        dimension: &Arc<str>,
        chunk: &Chunk,
    ) -> Result<usize, ClassifyError> {
        let classification = match chunk.palette.scope() {
            PaletteScope::Chunk => {
                self.scratch = PaletteClassification::new();
                &mut self.scratch
            }
            shared => self.shared.entry(shared.clone()).or_default(),
        };
        indexer.advance(classification, &chunk.palette)?;

        let before = self.matches.len();
        let found = chunk
            .blocks
            .positions_where(classification.lookup_table())
            .map(|local| BlockMatch::from_local(dimension, chunk.pos, local))
            .inspect(trace_match);
        self.matches.extend(found);
        Ok(self.matches.len() - before)
    }

    /// Test every voxel on its own, translating its entry each time.
    pub(crate) fn collect_brute_force<T: Translator + ?Sized>(
        &mut self,
        indexer: &PaletteIndexer<'_, T>,
        dimension: &Arc<str>,
        chunk: &Chunk,
    ) -> Result<usize, ClassifyError> {
        let before = self.matches.len();
        for (index, &id) in chunk.blocks.as_slice().iter().enumerate() {
            let Some(entry) = chunk.palette.get(id) else {
                continue;
            };
            if indexer.classify(id, entry)? {
                let local = chunk.blocks.position(index);
                let found = BlockMatch::from_local(dimension, chunk.pos, local);
                trace_match(&found);
                self.matches.push(found);
            }
        }
        Ok(self.matches.len() - before)
    }
}

fn trace_match(found: &BlockMatch) {
    trace!(
        x = found.x,
        y = found.y,
        z = found.z,
        dimension = %found.dimension,
        "Found block"
    );
}
