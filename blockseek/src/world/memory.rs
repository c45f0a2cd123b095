//! In-memory world built in code.

use std::sync::Arc;

use tracing::trace;

use super::{BlockVolume, Chunk, ChunkPos, WorldError, WorldSource, CHUNK_WIDTH};
use crate::block::BlockEntry;
use crate::palette::{Palette, PaletteScope};

/// Which palette newly written blocks are interned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaletteSharing {
    /// One palette for the whole world.
    #[default]
    World,
    /// One palette per dimension.
    Dimension,
    /// One palette per chunk.
    Chunk,
}

struct MemoryChunk {
    pos: ChunkPos,
    palette: Arc<Palette>,
    blocks: Arc<BlockVolume>,
    readable: bool,
}

struct MemoryDimension {
    name: String,
    palette: Arc<Palette>,
    chunks: Vec<MemoryChunk>,
}

/// A [`WorldSource`] held entirely in memory.
///
/// Every palette starts with air at id 0, so fresh volumes read back as air
/// whatever the sharing mode. Dimensions and chunks are reported in the
/// order they were first created.
pub struct MemoryWorld {
    sharing: PaletteSharing,
    height: usize,
    palette: Arc<Palette>,
    dimensions: Vec<MemoryDimension>,
    releases: usize,
}

impl Default for MemoryWorld {
    fn default() -> Self {
        Self::new(PaletteSharing::default(), 256)
    }
}

impl MemoryWorld {
    pub fn new(sharing: PaletteSharing, height: usize) -> Self {
        Self {
            sharing,
            height,
            palette: Arc::new(fresh_palette(PaletteScope::World)),
            dimensions: Vec::new(),
            releases: 0,
        }
    }

    pub fn sharing(&self) -> PaletteSharing {
        self.sharing
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of times [`release_cached`](WorldSource::release_cached) ran.
    pub fn release_count(&self) -> usize {
        self.releases
    }

    /// Add an empty dimension.
    pub fn add_dimension(&mut self, name: &str) -> &mut Self {
        self.dimension_index(name);
        self
    }

    /// Add an all-air chunk.
    pub fn add_chunk(&mut self, dimension: &str, pos: ChunkPos) -> &mut Self {
        self.chunk_index(dimension, pos);
        self
    }

    /// Add a chunk that is listed but fails to load.
    pub fn add_unreadable_chunk(&mut self, dimension: &str, pos: ChunkPos) -> &mut Self {
        let (d, c) = self.chunk_index(dimension, pos);
        self.dimensions[d].chunks[c].readable = false;
        self
    }

    /// Write a block, creating its dimension and chunk when missing.
    pub fn set_block(
        &mut self,
        dimension: &str,
        x: i32,
        y: i32,
        z: i32,
        entry: BlockEntry,
    ) -> Result<(), WorldError> {
        let ly = usize::try_from(y)
            .ok()
            .filter(|&ly| ly < self.height)
            .ok_or(WorldError::OutOfBounds { x, y, z })?;
        let pos = ChunkPos::containing(x, z);
        let lx = (x - pos.origin_x()) as usize;
        let lz = (z - pos.origin_z()) as usize;

        let (d, c) = self.chunk_index(dimension, pos);
        let palette = match self.sharing {
            PaletteSharing::World => &mut self.palette,
            PaletteSharing::Dimension => &mut self.dimensions[d].palette,
            PaletteSharing::Chunk => &mut self.dimensions[d].chunks[c].palette,
        };
        let id = Arc::make_mut(palette).intern(entry);

        let chunk = &mut self.dimensions[d].chunks[c];
        Arc::make_mut(&mut chunk.blocks).set(lx, ly, lz, id);
        Ok(())
    }

    /// Fill a whole chunk column with one block.
    pub fn fill_chunk(
        &mut self,
        dimension: &str,
        pos: ChunkPos,
        entry: BlockEntry,
    ) -> Result<(), WorldError> {
        for lx in 0..CHUNK_WIDTH as i32 {
            for lz in 0..CHUNK_WIDTH as i32 {
                for y in 0..self.height as i32 {
                    self.set_block(
                        dimension,
                        pos.origin_x() + lx,
                        y,
                        pos.origin_z() + lz,
                        entry.clone(),
                    )?;
                }
            }
        }
        Ok(())
    }

    fn dimension_index(&mut self, name: &str) -> usize {
        if let Some(index) = self.dimensions.iter().position(|d| d.name == name) {
            return index;
        }
        self.dimensions.push(MemoryDimension {
            name: name.to_string(),
            palette: Arc::new(fresh_palette(PaletteScope::Dimension(name.to_string()))),
            chunks: Vec::new(),
        });
        self.dimensions.len() - 1
    }

    fn chunk_index(&mut self, dimension: &str, pos: ChunkPos) -> (usize, usize) {
        let d = self.dimension_index(dimension);
        let height = self.height;
        let chunks = &mut self.dimensions[d].chunks;
        if let Some(c) = chunks.iter().position(|chunk| chunk.pos == pos) {
            return (d, c);
        }
        chunks.push(MemoryChunk {
            pos,
            palette: Arc::new(fresh_palette(PaletteScope::Chunk)),
            blocks: Arc::new(BlockVolume::new(height)),
            readable: true,
        });
        (d, chunks.len() - 1)
    }

    fn find_dimension(&self, name: &str) -> Result<&MemoryDimension, WorldError> {
        self.dimensions
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| WorldError::DimensionNotFound(name.to_string()))
    }
}

fn fresh_palette(scope: PaletteScope) -> Palette {
    let mut palette = Palette::new(scope);
    palette.intern(BlockEntry::air());
    palette
}

impl WorldSource for MemoryWorld {
    fn dimensions(&self) -> Vec<String> {
        self.dimensions.iter().map(|d| d.name.clone()).collect()
    }

    fn all_chunk_coords(&self, dimension: &str) -> Result<Vec<ChunkPos>, WorldError> {
        Ok(self
            .find_dimension(dimension)?
            .chunks
            .iter()
            .map(|chunk| chunk.pos)
            .collect())
    }

    fn get_chunk(&mut self, pos: ChunkPos, dimension: &str) -> Result<Chunk, WorldError> {
        let dim = self.find_dimension(dimension)?;
        let chunk = dim
            .chunks
            .iter()
            .find(|chunk| chunk.pos == pos)
            .ok_or_else(|| WorldError::ChunkNotFound {
                dimension: dimension.to_string(),
                cx: pos.cx,
                cz: pos.cz,
            })?;

        if !chunk.readable {
            return Err(WorldError::Unreadable {
                dimension: dimension.to_string(),
                cx: pos.cx,
                cz: pos.cz,
                reason: "chunk data is corrupt".to_string(),
            });
        }

        let palette = match self.sharing {
            PaletteSharing::World => &self.palette,
            PaletteSharing::Dimension => &dim.palette,
            PaletteSharing::Chunk => &chunk.palette,
        };
        Ok(Chunk::new(pos, Arc::clone(palette), Arc::clone(&chunk.blocks)))
    }

    fn release_cached(&mut self) {
        self.releases += 1;
        trace!(releases = self.releases, "Released cached chunks");
    }
}
