//! The chunk scanner.

use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::{BlockMatch, ScanConfig, ScanError, ScanMode, ScanProgress, ScanState};
use crate::block::BlockPattern;
use crate::export::ResultExporter;
use crate::palette::PaletteIndexer;
use crate::translate::Translator;
use crate::world::{ChunkPos, WorldSource};

/// A resumable search over every chunk of a world.
///
/// Each call to [`next`](Iterator::next) scans one chunk and yields the
/// progress after it. The chunk list is fixed when the search is created.
/// The first error ends the search; later calls return `None`.
///
/// Unreadable chunks are logged and counted as empty.
pub struct BlockSearch<'a, W: WorldSource + ?Sized, T: Translator + ?Sized> {
    world: &'a mut W,
    translator: &'a T,
    pattern: BlockPattern,
    config: ScanConfig,
    pending: VecDeque<(Arc<str>, ChunkPos)>,
    state: ScanState,
    failed: bool,
    started: Instant,
}

impl<'a, W: WorldSource + ?Sized, T: Translator + ?Sized> BlockSearch<'a, W, T> {
    /// Validate the pattern and list every chunk to scan.
    pub fn new(
        world: &'a mut W,
        translator: &'a T,
        pattern: BlockPattern,
        config: ScanConfig,
    ) -> Result<Self, ScanError> {
        pattern.validate()?;

        let mut pending = VecDeque::new();
        for dimension in world.dimensions() {
            let coords = world.all_chunk_coords(&dimension)?;
            let dimension: Arc<str> = Arc::from(dimension);
            pending.extend(coords.into_iter().map(|pos| (Arc::clone(&dimension), pos)));
        }

        info!(
            pattern = %pattern,
            target = %pattern.target,
            mode = %config.mode,
            chunks = pending.len(),
            "Starting block search"
        );

        Ok(Self {
            world,
            translator,
            pattern,
            config,
            state: ScanState::new(pending.len()),
            pending,
            failed: false,
            started: Instant::now(),
        })
    }

    pub fn pattern(&self) -> &BlockPattern {
        &self.pattern
    }

    pub fn progress(&self) -> ScanProgress {
        self.state.progress()
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Matches found so far, in scan order.
    pub fn matches(&self) -> &[BlockMatch] {
        self.state.matches()
    }

    /// Whether every chunk has been scanned without error.
    pub fn is_done(&self) -> bool {
        !self.failed && self.pending.is_empty()
    }

    /// The complete match list.
    ///
    /// Fails with [`ScanError::Incomplete`] unless every chunk was scanned.
    pub fn into_matches(self) -> Result<Vec<BlockMatch>, ScanError> {
        if !self.is_done() {
            let progress = self.state.progress();
            return Err(ScanError::Incomplete {
                chunks_done: progress.chunks_done,
                chunks_total: progress.chunks_total,
            });
        }
        Ok(self.state.into_matches())
    }

    fn scan_chunk(&mut self, dimension: &Arc<str>, pos: ChunkPos) -> Result<(), ScanError> {
        let loaded = pos
            .ensure_addressable()
            .and_then(|()| self.world.get_chunk(pos, dimension));
        let found = match loaded {
            Ok(chunk) => {
                let indexer = PaletteIndexer::new(&self.pattern, self.translator);
                match self.config.mode {
                    ScanMode::Palette => self.state.collect_indexed(&indexer, dimension, &chunk)?,
                    ScanMode::BruteForce => {
                        self.state.collect_brute_force(&indexer, dimension, &chunk)?
                    }
                }
            }
            Err(e) => {
                warn!(
                    dimension = %dimension,
                    cx = pos.cx,
                    cz = pos.cz,
                    error = %e,
                    "Chunk could not be loaded, treating as empty"
                );
                0
            }
        };

        self.state.finish_chunk();
        let progress = self.state.progress();
        debug!(
            dimension = %dimension,
            cx = pos.cx,
            cz = pos.cz,
            found,
            chunks_done = progress.chunks_done,
            chunks_total = progress.chunks_total,
            "Scanned chunk"
        );

        let interval = self.config.release_interval;
        if interval > 0 && progress.chunks_done % interval == 0 && !progress.is_done() {
            self.world.release_cached();
        }

        if progress.is_done() {
            info!(
                matches = self.state.matches().len(),
                chunks = progress.chunks_total,
                elapsed_ms = self.started.elapsed().as_millis() as u64,
                "Block search finished"
            );
        }
        Ok(())
    }
}

impl<W: WorldSource + ?Sized, T: Translator + ?Sized> Iterator for BlockSearch<'_, W, T> {
    type Item = Result<ScanProgress, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let (dimension, pos) = self.pending.pop_front()?;
        match self.scan_chunk(&dimension, pos) {
            Ok(()) => Some(Ok(self.state.progress())),
            Err(e) => {
                self.failed = true;
                warn!(error = %e, "Block search aborted");
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.pending.len()))
        }
    }
}

impl<W: WorldSource + ?Sized, T: Translator + ?Sized> FusedIterator for BlockSearch<'_, W, T> {}

/// Outcome of a completed [`run_search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    /// File the matches were written to.
    pub path: PathBuf,
    pub matches: usize,
    pub chunks: usize,
}

/// Run a search to completion and export the matches.
///
/// `on_progress` is called after every chunk. `cancel` is checked before each
/// chunk; once set the search stops with [`ScanError::Cancelled`] and no
/// file is written.
pub fn run_search<W, T, F>(
    world: &mut W,
    translator: &T,
    pattern: BlockPattern,
    config: ScanConfig,
    exporter: &ResultExporter,
    cancel: &AtomicBool,
    mut on_progress: F,
) -> Result<SearchReport, ScanError>
where
    W: WorldSource + ?Sized,
    T: Translator + ?Sized,
    F: FnMut(ScanProgress),
{
    let mut search = BlockSearch::new(world, translator, pattern, config)?;

    loop {
        if cancel.load(Ordering::Relaxed) {
            let progress = search.progress();
            info!(
                chunks_done = progress.chunks_done,
                chunks_total = progress.chunks_total,
                "Block search cancelled"
            );
            return Err(ScanError::Cancelled {
                chunks_done: progress.chunks_done,
                chunks_total: progress.chunks_total,
            });
        }
        match search.next() {
            Some(step) => on_progress(step?),
            None => break,
        }
    }

    let chunks = search.progress().chunks_total;
    let matches = search.into_matches()?;
    let path = exporter.export(&matches)?;

    Ok(SearchReport {
        path,
        matches: matches.len(),
        chunks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockEntry, TargetVersion};
    use crate::translate::{PassthroughTranslator, TranslateError};
    use crate::world::{MemoryWorld, PaletteSharing};

    fn stone_pattern() -> BlockPattern {
        BlockPattern::named(TargetVersion::universal(), "stone")
    }

    fn world_with_chunks(count: i32) -> MemoryWorld {
        let mut world = MemoryWorld::new(PaletteSharing::World, 4);
        for cx in 0..count {
            world.add_chunk("overworld", ChunkPos::new(cx, 0));
        }
        world
    }

    #[test]
    fn test_progress_per_chunk() {
        let mut world = world_with_chunks(3);
        let search = BlockSearch::new(
            &mut world,
            &PassthroughTranslator,
            stone_pattern(),
            ScanConfig::default(),
        )
        .unwrap();

        let steps: Vec<ScanProgress> = search.map(Result::unwrap).collect();
        let done: Vec<usize> = steps.iter().map(|p| p.chunks_done).collect();
        assert_eq!(done, vec![1, 2, 3]);
        assert!(steps.iter().all(|p| p.chunks_total == 3));
    }

    #[test]
    fn test_invalid_pattern_rejected_before_scan() {
        let mut world = world_with_chunks(1);
        let pattern = BlockPattern::named(TargetVersion::universal(), "");
        let result = BlockSearch::new(&mut world, &PassthroughTranslator, pattern, ScanConfig::default());
        assert!(matches!(result, Err(ScanError::Pattern(_))));
    }

    #[test]
    fn test_into_matches_before_completion() {
        let mut world = world_with_chunks(2);
        let mut search = BlockSearch::new(
            &mut world,
            &PassthroughTranslator,
            stone_pattern(),
            ScanConfig::default(),
        )
        .unwrap();
        search.next().unwrap().unwrap();

        assert!(!search.is_done());
        assert!(matches!(
            search.into_matches(),
            Err(ScanError::Incomplete {
                chunks_done: 1,
                chunks_total: 2
            })
        ));
    }

    #[test]
    fn test_translation_error_fuses_iterator() {
        let mut world = world_with_chunks(1);
        world
            .set_block("overworld", 40, 0, 0, BlockEntry::from_name("stone"))
            .unwrap();
        let pattern = BlockPattern::named(TargetVersion::new("bedrock", 11620), "stone");
        let mut search =
            BlockSearch::new(&mut world, &PassthroughTranslator, pattern, ScanConfig::default())
                .unwrap();

        match search.next() {
            Some(Err(ScanError::Translate(e))) => {
                assert!(matches!(e.source, TranslateError::UnsupportedTarget { .. }));
            }
            other => panic!("expected translation failure, got {:?}", other),
        }
        assert!(search.next().is_none());
        assert!(!search.is_done());
    }

    #[test]
    fn test_release_interval() {
        let mut world = world_with_chunks(5);
        let config = ScanConfig::default().with_release_interval(2);
        BlockSearch::new(&mut world, &PassthroughTranslator, stone_pattern(), config)
            .unwrap()
            .for_each(|step| {
                step.unwrap();
            });
        assert_eq!(world.release_count(), 2);

        let mut world = world_with_chunks(5);
        let config = ScanConfig::default().with_release_interval(0);
        BlockSearch::new(&mut world, &PassthroughTranslator, stone_pattern(), config)
            .unwrap()
            .for_each(|step| {
                step.unwrap();
            });
        assert_eq!(world.release_count(), 0);
    }

    #[test]
    fn test_empty_world_is_immediately_done() {
        let mut world = MemoryWorld::default();
        let mut search = BlockSearch::new(
            &mut world,
            &PassthroughTranslator,
            stone_pattern(),
            ScanConfig::default(),
        )
        .unwrap();
        assert!(search.next().is_none());
        assert!(search.progress().is_done());
        assert!(search.into_matches().unwrap().is_empty());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_progress_is_monotonic(
                layout in proptest::collection::vec(0usize..4, 0..5),
                brute_force in any::<bool>(),
            ) {
                let mut world = MemoryWorld::new(PaletteSharing::Dimension, 2);
                for (d, &chunks) in layout.iter().enumerate() {
                    let name = format!("dim{}", d);
                    world.add_dimension(&name);
                    for cx in 0..chunks as i32 {
                        world.add_chunk(&name, ChunkPos::new(cx, 0));
                    }
                }
                let total: usize = layout.iter().sum();
                let mode = if brute_force { ScanMode::BruteForce } else { ScanMode::Palette };

                let steps: Vec<ScanProgress> = BlockSearch::new(
                    &mut world,
                    &PassthroughTranslator,
                    stone_pattern(),
                    ScanConfig::default().with_mode(mode),
                )
                .unwrap()
                .map(Result::unwrap)
                .collect();

                prop_assert_eq!(steps.len(), total);
                prop_assert!(steps.windows(2).all(|w| w[0].chunks_done <= w[1].chunks_done));
                prop_assert_eq!(steps.iter().filter(|p| p.is_done()).count(), usize::from(total > 0));
                if let Some(last) = steps.last() {
                    prop_assert_eq!(last.chunks_done, total);
                }
            }
        }
    }
}
