//! Chunk-by-chunk block search over a world source.
//!
//! [`BlockSearch`] walks every chunk of every dimension, classifies newly
//! seen palette entries against the pattern and collects the world
//! coordinates of matching voxels. It is an iterator that yields one
//! [`ScanProgress`] per chunk, so a caller can interleave other work between
//! steps and cancel by simply dropping it.
//!
//! ```
//! use blockseek::block::{BlockEntry, BlockPattern, TargetVersion};
//! use blockseek::scan::{BlockSearch, ScanConfig};
//! use blockseek::translate::PassthroughTranslator;
//! use blockseek::world::MemoryWorld;
//!
//! let mut world = MemoryWorld::default();
//! world.set_block("overworld", 1, 2, 3, BlockEntry::from_name("stone")).unwrap();
//!
//! let pattern = BlockPattern::named(TargetVersion::universal(), "stone");
//! let mut search = BlockSearch::new(&mut world, &PassthroughTranslator, pattern, ScanConfig::default()).unwrap();
//! for step in search.by_ref() {
//!     let progress = step.unwrap();
//!     println!("{:.0}%", progress.fraction() * 100.0);
//! }
//! let matches = search.into_matches().unwrap();
//! assert_eq!(matches.len(), 1);
//! ```

mod search;
mod state;

pub use search::{run_search, BlockSearch, SearchReport};
pub use state::ScanState;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::block::PatternError;
use crate::export::ExportError;
use crate::palette::ClassifyError;
use crate::world::{ChunkPos, WorldError};

/// Default number of chunks between cache releases.
pub const DEFAULT_RELEASE_INTERVAL: usize = 256;

/// Errors that end a search.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("Failed to list world chunks: {0}")]
    World(#[from] WorldError),

    #[error(transparent)]
    Translate(#[from] ClassifyError),

    #[error("Failed to export matches: {0}")]
    Export(#[from] ExportError),

    #[error("Search has only scanned {chunks_done} of {chunks_total} chunks")]
    Incomplete {
        chunks_done: usize,
        chunks_total: usize,
    },

    #[error("Search cancelled after {chunks_done} of {chunks_total} chunks")]
    Cancelled {
        chunks_done: usize,
        chunks_total: usize,
    },
}

/// How chunk voxels are tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Classify each palette entry once, then look voxels up by id.
    #[default]
    Palette,
    /// Translate and test every voxel on its own.
    BruteForce,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Palette => "palette",
            ScanMode::BruteForce => "brute-force",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "palette" => Ok(ScanMode::Palette),
            "brute-force" | "brute_force" | "bruteforce" => Ok(ScanMode::BruteForce),
            other => Err(format!(
                "unknown scan mode '{}', expected 'palette' or 'brute-force'",
                other
            )),
        }
    }
}

/// Search options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub mode: ScanMode,
    /// Chunks between calls to `release_cached`; 0 never releases.
    pub release_interval: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            mode: ScanMode::Palette,
            release_interval: DEFAULT_RELEASE_INTERVAL,
        }
    }
}

impl ScanConfig {
    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_release_interval(mut self, release_interval: usize) -> Self {
        self.release_interval = release_interval;
        self
    }
}

/// World position of one matching voxel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockMatch {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub dimension: Arc<str>,
}

impl BlockMatch {
    pub fn new(x: i32, y: i32, z: i32, dimension: impl Into<Arc<str>>) -> Self {
        Self {
            x,
            y,
            z,
            dimension: dimension.into(),
        }
    }

    /// Match at a local voxel of the chunk at `pos`.
    pub fn from_local(dimension: &Arc<str>, pos: ChunkPos, local: (usize, usize, usize)) -> Self {
        let (lx, ly, lz) = local;
        Self {
            x: pos.origin_x() + lx as i32,
            y: ly as i32,
            z: pos.origin_z() + lz as i32,
            dimension: Arc::clone(dimension),
        }
    }
}

impl fmt::Display for BlockMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}) in {}", self.x, self.y, self.z, self.dimension)
    }
}

/// Progress after a chunk step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    pub chunks_done: usize,
    pub chunks_total: usize,
}

impl ScanProgress {
    /// Fraction of chunks processed; 1.0 for a world without chunks.
    pub fn fraction(&self) -> f64 {
        if self.chunks_total == 0 {
            1.0
        } else {
            self.chunks_done as f64 / self.chunks_total as f64
        }
    }

    pub fn is_done(&self) -> bool {
        self.chunks_done == self.chunks_total
    }
}

impl fmt::Display for ScanProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} chunks", self.chunks_done, self.chunks_total)
    }
}
