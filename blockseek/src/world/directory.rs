//! World stored as JSON chunk files on disk.
//!
//! # Layout
//!
//! ```text
//! <root>/
//!   overworld/
//!     c.0.0.json
//!     c.-1.3.json.gz
//!   the_nether/
//!     c.2.-7.json
//! ```
//!
//! Each top-level directory is a dimension. Chunk files hold a chunk-local
//! palette and a flat id array in `(x, y, z)` storage order:
//!
//! ```json
//! {
//!   "height": 256,
//!   "palette": [
//!     { "name": "minecraft:air" },
//!     { "name": "minecraft:wool", "properties": { "color": "red" } }
//!   ],
//!   "blocks": [0, 0, 1, ...]
//! }
//! ```
//!
//! Chunk palettes are merged into one world-wide [`Palette`] as chunks are
//! loaded, and voxel ids are remapped onto it. The palette therefore grows
//! during a scan, and a classification of it stays valid across chunks.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use flate2::read::GzDecoder;
use moka::sync::Cache;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{BlockVolume, Chunk, ChunkPos, WorldError, WorldSource, MAX_CHUNK_HEIGHT};
use crate::block::{BlockEntry, PropertyValue};
use crate::palette::{Palette, PaletteScope};

/// Default number of decoded chunks kept in memory.
pub const DEFAULT_CHUNK_CACHE: u64 = 1024;

/// Options for opening a [`DirectoryWorld`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryWorldConfig {
    /// Maximum number of decoded chunks held in the cache.
    pub chunk_cache: u64,
}

impl Default for DirectoryWorldConfig {
    fn default() -> Self {
        Self {
            chunk_cache: DEFAULT_CHUNK_CACHE,
        }
    }
}

impl DirectoryWorldConfig {
    pub fn with_chunk_cache(mut self, chunk_cache: u64) -> Self {
        self.chunk_cache = chunk_cache;
        self
    }
}

#[derive(Debug, Deserialize)]
struct ChunkFile {
    height: usize,
    palette: Vec<PaletteFileEntry>,
    blocks: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct PaletteFileEntry {
    name: String,
    #[serde(default)]
    properties: BTreeMap<String, PropertyValue>,
}

fn chunk_file_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^c\.(-?\d+)\.(-?\d+)\.json(\.gz)?$").unwrap())
}

/// Parse a chunk file name such as `c.-1.3.json.gz`.
///
/// ```
/// use blockseek::world::{parse_chunk_filename, ChunkPos};
///
/// assert_eq!(parse_chunk_filename("c.-1.3.json.gz"), Some(ChunkPos::new(-1, 3)));
/// assert_eq!(parse_chunk_filename("level.dat"), None);
/// ```
pub fn parse_chunk_filename(name: &str) -> Option<ChunkPos> {
    let caps = chunk_file_pattern().captures(name)?;
    let cx = caps[1].parse().ok()?;
    let cz = caps[2].parse().ok()?;
    Some(ChunkPos::new(cx, cz))
}

/// A [`WorldSource`] reading chunk files from a directory tree.
pub struct DirectoryWorld {
    root: PathBuf,
    dimensions: Vec<String>,
    chunk_files: HashMap<String, BTreeMap<ChunkPos, PathBuf>>,
    palette: Arc<Palette>,
    cache: Cache<(String, ChunkPos), Arc<BlockVolume>>,
}

impl DirectoryWorld {
    /// Index the dimensions and chunk files under `root`.
    ///
    /// Only file names are read here; chunk content is decoded on demand.
    pub fn open(root: impl AsRef<Path>, config: DirectoryWorldConfig) -> Result<Self, WorldError> {
        let root = root.as_ref().to_path_buf();

        let mut dimensions = Vec::new();
        for entry in read_dir(&root)? {
            let entry = entry.map_err(|source| io_error(&root, source))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || !entry.path().is_dir() {
                continue;
            }
            dimensions.push(name);
        }
        dimensions.sort();

        let mut chunk_files = HashMap::new();
        for dimension in &dimensions {
            chunk_files.insert(dimension.clone(), index_dimension(&root.join(dimension))?);
        }

        let chunks: usize = chunk_files.values().map(BTreeMap::len).sum();
        info!(
            root = %root.display(),
            dimensions = dimensions.len(),
            chunks,
            "Opened world directory"
        );

        Ok(Self {
            root,
            dimensions,
            chunk_files,
            palette: Arc::new(Palette::new(PaletteScope::World)),
            cache: Cache::new(config.chunk_cache),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The merged world palette as loaded so far.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Whether a decoded chunk is currently cached.
    pub fn is_cached(&self, pos: ChunkPos, dimension: &str) -> bool {
        self.cache.contains_key(&(dimension.to_string(), pos))
    }

    fn load_volume(&mut self, path: &Path) -> Result<Arc<BlockVolume>, WorldError> {
        let file = read_chunk_file(path)?;
        let malformed = |reason: String| WorldError::Malformed {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(&bad) = file.blocks.iter().find(|&&id| id as usize >= file.palette.len()) {
            return Err(malformed(format!(
                "block id {} outside chunk palette of {} entries",
                bad,
                file.palette.len()
            )));
        }
        let expected = BlockVolume::volume(file.height).ok_or_else(|| {
            malformed(format!(
                "height {} exceeds the limit of {}",
                file.height, MAX_CHUNK_HEIGHT
            ))
        })?;
        if file.blocks.len() != expected {
            return Err(malformed(format!(
                "expected {} block ids for height {}, got {}",
                expected,
                file.height,
                file.blocks.len()
            )));
        }

        let palette = Arc::make_mut(&mut self.palette);
        let remap: Vec<u32> = file
            .palette
            .into_iter()
            .map(|entry| palette.intern(BlockEntry::from_typed(&entry.name, entry.properties)))
            .collect();
        let ids = file.blocks.iter().map(|&id| remap[id as usize]).collect();

        debug!(
            path = %path.display(),
            palette_len = palette.len(),
            "Decoded chunk file"
        );
        Ok(Arc::new(BlockVolume::from_vec(file.height, ids)?))
    }
}

fn read_dir(path: &Path) -> Result<fs::ReadDir, WorldError> {
    fs::read_dir(path).map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> WorldError {
    WorldError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn index_dimension(dir: &Path) -> Result<BTreeMap<ChunkPos, PathBuf>, WorldError> {
    let mut files: BTreeMap<ChunkPos, PathBuf> = BTreeMap::new();
    for entry in read_dir(dir)? {
        let entry = entry.map_err(|source| io_error(dir, source))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(pos) = parse_chunk_filename(&name) else {
            continue;
        };
        let path = entry.path();
        if let Err(e) = pos.ensure_addressable() {
            warn!(path = %path.display(), error = %e, "Skipping chunk file");
            continue;
        }
        // plain .json sorts before .json.gz, so the plain file wins
        let replace = match files.get(&pos) {
            Some(previous) if previous <= &path => {
                warn!(kept = %previous.display(), ignored = %path.display(), "Duplicate chunk file");
                false
            }
            Some(previous) => {
                warn!(kept = %path.display(), ignored = %previous.display(), "Duplicate chunk file");
                true
            }
            None => true,
        };
        if replace {
            files.insert(pos, path);
        }
    }
    Ok(files)
}

fn read_chunk_file(path: &Path) -> Result<ChunkFile, WorldError> {
    let file = File::open(path).map_err(|source| io_error(path, source))?;
    let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    serde_json::from_reader(reader).map_err(|source| WorldError::Json {
        path: path.to_path_buf(),
        source,
    })
}

impl WorldSource for DirectoryWorld {
    fn dimensions(&self) -> Vec<String> {
        self.dimensions.clone()
    }

    fn all_chunk_coords(&self, dimension: &str) -> Result<Vec<ChunkPos>, WorldError> {
        self.chunk_files
            .get(dimension)
            .map(|files| files.keys().copied().collect())
            .ok_or_else(|| WorldError::DimensionNotFound(dimension.to_string()))
    }

    fn get_chunk(&mut self, pos: ChunkPos, dimension: &str) -> Result<Chunk, WorldError> {
        let path = self
            .chunk_files
            .get(dimension)
            .ok_or_else(|| WorldError::DimensionNotFound(dimension.to_string()))?
            .get(&pos)
            .ok_or_else(|| WorldError::ChunkNotFound {
                dimension: dimension.to_string(),
                cx: pos.cx,
                cz: pos.cz,
            })?
            .clone();

        let key = (dimension.to_string(), pos);
        let blocks = match self.cache.get(&key) {
            Some(blocks) => blocks,
            None => {
                let blocks = self.load_volume(&path)?;
                self.cache.insert(key, Arc::clone(&blocks));
                blocks
            }
        };

        Ok(Chunk::new(pos, Arc::clone(&self.palette), blocks))
    }

    fn release_cached(&mut self) {
        self.cache.invalidate_all();
        debug!("Released chunk cache");
    }
}
