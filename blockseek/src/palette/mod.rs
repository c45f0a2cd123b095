//! Block palettes and incremental palette classification.
//!
//! Voxels reference block variants through a dense integer id into a
//! [`Palette`]. Classifying each palette entry once against the search pattern,
//! and reusing that decision for every voxel carrying the id, turns a per-voxel
//! pattern test into a per-variant one.
//!
//! # Palette scope
//!
//! Depending on the world source a palette may cover the whole world, one
//! dimension, or a single chunk. The [`PaletteScope`] tag tells the scanner
//! which classification state a palette's ids belong to:
//!
//! ```text
//! World / Dimension(name)  ──► one PaletteClassification kept for the whole scan
//! Chunk                    ──► scratch classification, discarded after the chunk
//! ```
//!
//! Palettes are append-only: an id, once assigned, always refers to the same
//! entry.

mod indexer;

pub use indexer::{ClassifyError, PaletteClassification, PaletteIndexer};

use std::collections::HashMap;

use crate::block::BlockEntry;

/// What a palette's ids are shared across.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PaletteScope {
    /// One palette shared by every chunk of every dimension.
    World,
    /// One palette shared by every chunk of the named dimension.
    Dimension(String),
    /// The palette belongs to a single chunk.
    Chunk,
}

/// Append-only, deduplicated list of block entries addressed by dense ids.
#[derive(Debug, Clone)]
pub struct Palette {
    scope: PaletteScope,
    entries: Vec<BlockEntry>,
    ids: HashMap<BlockEntry, u32>,
}

impl Palette {
    /// Create an empty palette.
    pub fn new(scope: PaletteScope) -> Self {
        Self {
            scope,
            entries: Vec::new(),
            ids: HashMap::new(),
        }
    }

    pub fn scope(&self) -> &PaletteScope {
        &self.scope
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for an id, if assigned.
    #[inline]
    pub fn get(&self, id: u32) -> Option<&BlockEntry> {
        self.entries.get(id as usize)
    }

    /// Id of an entry, if present.
    pub fn id_of(&self, entry: &BlockEntry) -> Option<u32> {
        self.ids.get(entry).copied()
    }

    /// Return the id of `entry`, appending it if it is new.
    pub fn intern(&mut self, entry: BlockEntry) -> u32 {
        if let Some(&id) = self.ids.get(&entry) {
            return id;
        }
        let id = self.entries.len() as u32;
        self.ids.insert(entry.clone(), id);
        self.entries.push(entry);
        id
    }

    /// All entries in id order.
    pub fn entries(&self) -> &[BlockEntry] {
        &self.entries
    }
}
