//! Blockseek CLI - command-line interface
//!
//! Searches chunked voxel worlds for blocks matching a pattern and writes the
//! positions of every match to a CSV file.

mod commands;
mod error;

use blockseek::config::ConfigFile;
use blockseek::logging::{init_logging, LoggingGuard};
use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::find::FindArgs;
use commands::pick::PickArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "blockseek", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Find every block matching a pattern and export the positions
    Find(FindArgs),

    /// Print the block at a position as a pattern
    Pick(PickArgs),

    /// View or change configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Logging failures are reported but never stop a command.
fn start_logging(config: &ConfigFile) -> Option<LoggingGuard> {
    match init_logging(&config.logging_config()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: {}", CliError::from(e));
            None
        }
    }
}

fn run(cli: Cli, config: &ConfigFile) -> Result<(), CliError> {
    match cli.command {
        Commands::Find(args) => commands::find::run(args, config),
        Commands::Pick(args) => commands::pick::run(args, config),
        Commands::Config { command } => commands::config::run(command),
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match ConfigFile::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {}, using defaults", e);
            ConfigFile::default()
        }
    };
    let _logging = start_logging(&config);

    if let Err(e) = run(cli, &config) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockseek::scan::ScanMode;
    use std::path::PathBuf;

    #[test]
    fn test_find_parses_every_flag() {
        let cli = Cli::try_parse_from([
            "blockseek",
            "find",
            "/worlds/castle",
            "wool[color=*]",
            "--platform",
            "bedrock",
            "--version",
            "11620",
            "--force-blockstate",
            "--mappings",
            "map.json",
            "--output-dir",
            "out",
            "--brute-force",
        ])
        .unwrap();

        match cli.command {
            Commands::Find(args) => {
                assert_eq!(args.world, PathBuf::from("/worlds/castle"));
                assert_eq!(args.pattern, "wool[color=*]");
                assert_eq!(args.platform, "bedrock");
                assert_eq!(args.target_version, 11620);
                assert!(args.force_blockstate);
                assert_eq!(args.mappings, Some(PathBuf::from("map.json")));
                assert_eq!(args.output_dir, Some(PathBuf::from("out")));
                assert!(args.brute_force);
            }
            other => panic!("expected find, got {:?}", other),
        }
    }

    #[test]
    fn test_find_defaults_to_universal() {
        let cli = Cli::try_parse_from(["blockseek", "find", "w", "stone"]).unwrap();
        match cli.command {
            Commands::Find(args) => {
                assert_eq!(args.platform, "universal");
                assert_eq!(args.target_version, 0);
                assert!(!args.brute_force);
                assert!(args.mappings.is_none());
            }
            other => panic!("expected find, got {:?}", other),
        }
        assert_eq!(ScanMode::default(), ScanMode::Palette);
    }

    #[test]
    fn test_pick_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "blockseek",
            "pick",
            "w",
            "-12",
            "64",
            "-300",
            "--dimension",
            "the_nether",
        ])
        .unwrap();

        match cli.command {
            Commands::Pick(args) => {
                assert_eq!((args.x, args.y, args.z), (-12, 64, -300));
                assert_eq!(args.dimension, "the_nether");
            }
            other => panic!("expected pick, got {:?}", other),
        }
    }

    #[test]
    fn test_config_subcommands_parse() {
        let cli = Cli::try_parse_from(["blockseek", "config", "set", "scan.mode", "brute-force"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Set { ref key, ref value }
            } if key == "scan.mode" && value == "brute-force"
        ));
    }
}
