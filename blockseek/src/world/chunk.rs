//! Chunk columns and their dense block volumes.

use std::sync::Arc;

use super::{ChunkPos, WorldError, CHUNK_WIDTH, MAX_CHUNK_HEIGHT};
use crate::block::BlockEntry;
use crate::palette::Palette;

/// Dense `(16, height, 16)` array of palette ids stored contiguously.
///
/// The voxel `(x, y, z)` lives at `(x * height + y) * 16 + z`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockVolume {
    height: usize,
    data: Vec<u32>,
}

impl BlockVolume {
    /// Volume filled with palette id 0.
    pub fn new(height: usize) -> Self {
        Self::filled(height, 0)
    }

    /// Volume filled with one palette id.
    ///
    /// # Panics
    ///
    /// Panics if `height` exceeds [`MAX_CHUNK_HEIGHT`].
    pub fn filled(height: usize, id: u32) -> Self {
        let Some(len) = Self::volume(height) else {
            panic!("chunk height {} exceeds {}", height, MAX_CHUNK_HEIGHT);
        };
        Self {
            height,
            data: vec![id; len],
        }
    }

    /// Wrap existing ids, checking the length against the shape.
    pub fn from_vec(height: usize, data: Vec<u32>) -> Result<Self, WorldError> {
        let expected = Self::volume(height).ok_or(WorldError::HeightOutOfRange(height))?;
        if data.len() != expected {
            return Err(WorldError::VolumeShape {
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { height, data })
    }

    /// Number of voxels in a column of `height`, or `None` when the height
    /// is above [`MAX_CHUNK_HEIGHT`].
    ///
    /// Never allocates, so it is safe on heights read from untrusted files.
    pub fn volume(height: usize) -> Option<usize> {
        if height > MAX_CHUNK_HEIGHT {
            return None;
        }
        CHUNK_WIDTH
            .checked_mul(height)?
            .checked_mul(CHUNK_WIDTH)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        x < CHUNK_WIDTH && y < self.height && z < CHUNK_WIDTH
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.height + y) * CHUNK_WIDTH + z
    }

    /// Inverse of [`index`](Self::index).
    #[inline]
    pub fn position(&self, index: usize) -> (usize, usize, usize) {
        let z = index % CHUNK_WIDTH;
        let column = index / CHUNK_WIDTH;
        (column / self.height, column % self.height, z)
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<u32> {
        self.contains(x, y, z)
            .then(|| self.data[self.index(x, y, z)])
    }

    /// Set a voxel; returns false when the position is outside the volume.
    pub fn set(&mut self, x: usize, y: usize, z: usize, id: u32) -> bool {
        if !self.contains(x, y, z) {
            return false;
        }
        let index = self.index(x, y, z);
        self.data[index] = id;
        true
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }

    /// Every local position whose id is flagged in `lookup`.
    ///
    /// One pass over the contiguous id slice; ids past the end of the table
    /// never match. Positions come out in storage order.
    pub fn positions_where<'a>(
        &'a self,
        lookup: &'a [bool],
    ) -> impl Iterator<Item = (usize, usize, usize)> + 'a {
        self.data
            .iter()
            .enumerate()
            .filter(move |&(_, &id)| lookup.get(id as usize).copied().unwrap_or(false))
            .map(move |(index, _)| self.position(index))
    }
}

/// One loaded chunk column.
///
/// The palette is shared with every other chunk in the same
/// [`PaletteScope`](crate::palette::PaletteScope).
#[derive(Debug, Clone)]
pub struct Chunk {
    pub pos: ChunkPos,
    pub palette: Arc<Palette>,
    pub blocks: Arc<BlockVolume>,
}

impl Chunk {
    pub fn new(pos: ChunkPos, palette: Arc<Palette>, blocks: Arc<BlockVolume>) -> Self {
        Self {
            pos,
            palette,
            blocks,
        }
    }

    pub fn height(&self) -> usize {
        self.blocks.height()
    }

    /// Palette entry of a local voxel.
    pub fn block_at(&self, x: usize, y: usize, z: usize) -> Option<&BlockEntry> {
        self.blocks.get(x, y, z).and_then(|id| self.palette.get(id))
    }
}
