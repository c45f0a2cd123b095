//! Read-only access to chunked voxel worlds.
//!
//! The scanner only depends on the [`WorldSource`] trait. Two sources ship
//! with the crate:
//!
//! - [`MemoryWorld`]: built in code, with a configurable palette scope
//! - [`DirectoryWorld`]: JSON chunk files on disk, one directory per dimension
//!
//! Chunks are columns of 16 × height × 16 voxels. World coordinates are
//! derived from the chunk position and the in-chunk offset:
//! `x = cx * 16 + lx`, `y = ly`, `z = cz * 16 + lz`.

mod chunk;
mod directory;
mod memory;

pub use chunk::{BlockVolume, Chunk};
pub use directory::{
    parse_chunk_filename, DirectoryWorld, DirectoryWorldConfig, DEFAULT_CHUNK_CACHE,
};
pub use memory::{MemoryWorld, PaletteSharing};

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::block::BlockEntry;

/// Width and depth of a chunk column in voxels.
pub const CHUNK_WIDTH: usize = 16;

/// Tallest chunk column a world may declare.
pub const MAX_CHUNK_HEIGHT: usize = 4096;

/// Errors raised by world sources.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("Dimension '{0}' does not exist")]
    DimensionNotFound(String),

    #[error("Chunk ({cx}, {cz}) does not exist in {dimension}")]
    ChunkNotFound {
        dimension: String,
        cx: i32,
        cz: i32,
    },

    #[error("Chunk ({cx}, {cz}) in {dimension} cannot be read: {reason}")]
    Unreadable {
        dimension: String,
        cx: i32,
        cz: i32,
        reason: String,
    },

    #[error("Position ({x}, {y}, {z}) is outside the world height")]
    OutOfBounds { x: i32, y: i32, z: i32 },

    #[error("Chunk height {0} exceeds the limit of {max}", max = MAX_CHUNK_HEIGHT)]
    HeightOutOfRange(usize),

    #[error("Chunk ({cx}, {cz}) lies outside the addressable world")]
    PositionOutOfRange { cx: i32, cz: i32 },

    #[error("Block volume of height {height} needs {expected} ids, got {actual}")]
    VolumeShape {
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Voxel references unassigned palette id {0}")]
    DanglingId(u32),

    #[error("Malformed chunk file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid chunk JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Horizontal position of a chunk column, in chunk units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPos {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkPos {
    /// Smallest chunk coordinate whose voxels all have `i32` world coordinates.
    pub const MIN_COORD: i32 = i32::MIN / CHUNK_WIDTH as i32;
    /// Largest chunk coordinate whose voxels all have `i32` world coordinates.
    pub const MAX_COORD: i32 = i32::MAX / CHUNK_WIDTH as i32;

    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    /// Whether every voxel of this chunk has an `i32` world position.
    pub fn is_addressable(&self) -> bool {
        let range = Self::MIN_COORD..=Self::MAX_COORD;
        range.contains(&self.cx) && range.contains(&self.cz)
    }

    /// Fails with [`WorldError::PositionOutOfRange`] for chunks whose world
    /// coordinates would overflow.
    pub fn ensure_addressable(&self) -> Result<(), WorldError> {
        if self.is_addressable() {
            Ok(())
        } else {
            Err(WorldError::PositionOutOfRange {
                cx: self.cx,
                cz: self.cz,
            })
        }
    }

    /// Chunk containing the world column `(x, z)`.
    pub fn containing(x: i32, z: i32) -> Self {
        let width = CHUNK_WIDTH as i32;
        Self::new(x.div_euclid(width), z.div_euclid(width))
    }

    /// World x of the chunk's first column.
    ///
    /// Only meaningful for [addressable](Self::is_addressable) chunks.
    #[inline]
    pub fn origin_x(&self) -> i32 {
        self.cx * CHUNK_WIDTH as i32
    }

    /// World z of the chunk's first column.
    #[inline]
    pub fn origin_z(&self) -> i32 {
        self.cz * CHUNK_WIDTH as i32
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.cx, self.cz)
    }
}

/// A chunked world the scanner can read.
///
/// Implementations never modify world content. Iteration order of
/// [`dimensions`](WorldSource::dimensions) and
/// [`all_chunk_coords`](WorldSource::all_chunk_coords) must be deterministic
/// for an unchanged source.
pub trait WorldSource {
    /// Identifiers of every dimension.
    fn dimensions(&self) -> Vec<String>;

    /// Every chunk position present in a dimension.
    fn all_chunk_coords(&self, dimension: &str) -> Result<Vec<ChunkPos>, WorldError>;

    /// Load one chunk.
    fn get_chunk(&mut self, pos: ChunkPos, dimension: &str) -> Result<Chunk, WorldError>;

    /// Block at a world position.
    fn get_block(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        dimension: &str,
    ) -> Result<BlockEntry, WorldError> {
        let pos = ChunkPos::containing(x, z);
        let chunk = self.get_chunk(pos, dimension)?;

        let ly = usize::try_from(y)
            .ok()
            .filter(|&ly| ly < chunk.height())
            .ok_or(WorldError::OutOfBounds { x, y, z })?;
        let lx = (x - pos.origin_x()) as usize;
        let lz = (z - pos.origin_z()) as usize;

        let id = chunk
            .blocks
            .get(lx, ly, lz)
            .ok_or(WorldError::OutOfBounds { x, y, z })?;
        chunk
            .palette
            .get(id)
            .cloned()
            .ok_or(WorldError::DanglingId(id))
    }

    /// Drop cached chunk data. Never writes anything back.
    fn release_cached(&mut self) {}
}
