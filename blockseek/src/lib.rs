//! Blockseek - find every block matching a pattern in a chunked voxel world
//!
//! The search walks each chunk of each dimension, classifies the chunk's block
//! palette against the pattern once per distinct block variant, and then
//! looks up matching voxels by palette id in a single pass over the chunk's
//! contiguous id array. Results are exported as `x,y,z,dimension` records.
//!
//! # Modules
//!
//! - [`block`]: block entries, patterns and the pattern matcher
//! - [`palette`]: palettes and incremental palette classification
//! - [`translate`]: conversion of universal blocks into a target version
//! - [`world`]: the world source trait plus in-memory and on-disk sources
//! - [`scan`]: the resumable chunk scanner
//! - [`export`]: result files
//! - [`config`]: user configuration (`~/.blockseek/config.ini`)
//! - [`logging`]: log file setup
//!
//! # Example
//!
//! ```
//! use blockseek::block::{BlockEntry, BlockPattern, TargetVersion};
//! use blockseek::scan::{BlockSearch, ScanConfig};
//! use blockseek::translate::PassthroughTranslator;
//! use blockseek::world::MemoryWorld;
//!
//! let mut world = MemoryWorld::default();
//! world
//!     .set_block("overworld", 4, 60, -9, BlockEntry::from_name("wool").with_property("color", "red"))
//!     .unwrap();
//!
//! let pattern = BlockPattern::parse("wool[color=*]", TargetVersion::universal()).unwrap();
//! let mut search = BlockSearch::new(&mut world, &PassthroughTranslator, pattern, ScanConfig::default()).unwrap();
//! while let Some(step) = search.next() {
//!     step.unwrap();
//! }
//!
//! let matches = search.into_matches().unwrap();
//! assert_eq!((matches[0].x, matches[0].y, matches[0].z), (4, 60, -9));
//! ```

pub mod block;
pub mod config;
pub mod export;
pub mod logging;
pub mod palette;
pub mod scan;
pub mod translate;
pub mod world;

pub use block::{BlockEntry, BlockPattern, TargetVersion};
pub use export::ResultExporter;
pub use scan::{run_search, BlockMatch, BlockSearch, ScanConfig, ScanError, ScanMode};
pub use world::{DirectoryWorld, MemoryWorld, WorldSource};
