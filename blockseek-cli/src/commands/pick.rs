//! Pick command - print the block at a world position as a pattern.

use std::path::PathBuf;

use blockseek::block::TargetVersion;
use blockseek::config::ConfigFile;
use blockseek::world::{DirectoryWorld, WorldSource};
use clap::Args;

use crate::error::CliError;

/// Arguments for the pick command.
#[derive(Debug, Args)]
pub struct PickArgs {
    /// World directory containing one subdirectory per dimension
    pub world: PathBuf,

    /// World X coordinate
    #[arg(allow_hyphen_values = true)]
    pub x: i32,

    /// World Y coordinate
    #[arg(allow_hyphen_values = true)]
    pub y: i32,

    /// World Z coordinate
    #[arg(allow_hyphen_values = true)]
    pub z: i32,

    /// Dimension to read from
    #[arg(long, default_value = "overworld")]
    pub dimension: String,
}

/// Run the pick command.
///
/// The output is an exact pattern that `blockseek find` accepts as-is.
pub fn run(args: PickArgs, config: &ConfigFile) -> Result<(), CliError> {
    let mut world = DirectoryWorld::open(&args.world, config.world_config())?;
    let entry = world.get_block(args.x, args.y, args.z, &args.dimension)?;
    println!("{}", entry.to_pattern(TargetVersion::universal()));
    Ok(())
}
