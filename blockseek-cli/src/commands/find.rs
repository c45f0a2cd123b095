//! Find command - search a world for blocks matching a pattern.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use blockseek::block::{BlockPattern, TargetVersion};
use blockseek::config::ConfigFile;
use blockseek::export::ResultExporter;
use blockseek::scan::{run_search, ScanConfig, ScanMode, ScanProgress};
use blockseek::translate::{MappingTranslator, PassthroughTranslator, Translator};
use blockseek::world::DirectoryWorld;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::error::CliError;

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({eta})";

/// Arguments for the find command.
#[derive(Debug, Args)]
pub struct FindArgs {
    /// World directory containing one subdirectory per dimension
    pub world: PathBuf,

    /// Block pattern, e.g. "minecraft:furnace[lit=*,facing=north]"
    pub pattern: String,

    /// Platform the pattern is written for
    #[arg(long, default_value = TargetVersion::UNIVERSAL_PLATFORM)]
    pub platform: String,

    /// Version number the pattern is written for
    #[arg(long = "version", default_value_t = 0)]
    pub target_version: u32,

    /// Match against blockstate names instead of the platform's native form
    #[arg(long)]
    pub force_blockstate: bool,

    /// JSON mapping file used to translate blocks into the pattern's version
    #[arg(long, value_name = "FILE")]
    pub mappings: Option<PathBuf>,

    /// Directory for the results file (overrides [output] directory)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Test every voxel individually instead of classifying palettes
    #[arg(long)]
    pub brute_force: bool,
}

impl FindArgs {
    fn target(&self) -> TargetVersion {
        TargetVersion::new(&self.platform, self.target_version)
            .with_force_blockstate(self.force_blockstate)
    }

    fn scan_config(&self, config: &ConfigFile) -> ScanConfig {
        let scan = config.scan_config();
        if self.brute_force {
            scan.with_mode(ScanMode::BruteForce)
        } else {
            scan
        }
    }

    fn output_directory(&self, config: &ConfigFile) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| config.output.directory.clone())
    }

    fn translator(&self) -> Result<Box<dyn Translator>, CliError> {
        match &self.mappings {
            Some(path) => Ok(Box::new(MappingTranslator::from_file(path)?)),
            None => Ok(Box::new(PassthroughTranslator)),
        }
    }
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar
}

fn update_bar(bar: &ProgressBar, progress: ScanProgress) {
    bar.set_length(progress.chunks_total as u64);
    bar.set_position(progress.chunks_done as u64);
}

/// Run the find command.
pub fn run(args: FindArgs, config: &ConfigFile) -> Result<(), CliError> {
    let pattern = BlockPattern::parse(&args.pattern, args.target())?;
    let translator = args.translator()?;
    let scan_config = args.scan_config(config);
    let exporter = ResultExporter::new(args.output_directory(config));
    let mut world = DirectoryWorld::open(&args.world, config.world_config())?;

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel.clone();
    ctrlc::set_handler(move || {
        cancel_clone.store(true, Ordering::SeqCst);
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    println!(
        "Searching {} for {} ({} mode)",
        style(args.world.display()).cyan(),
        style(&pattern).bold(),
        scan_config.mode
    );
    println!("Press Ctrl+C to stop");
    println!();

    info!(
        world = %args.world.display(),
        pattern = %pattern,
        mode = %scan_config.mode,
        "Starting find"
    );

    let bar = progress_bar();
    let result = run_search(
        &mut world,
        &*translator,
        pattern,
        scan_config,
        &exporter,
        &cancel,
        |progress| update_bar(&bar, progress),
    );

    let report = match result {
        Ok(report) => {
            bar.finish_and_clear();
            report
        }
        Err(e) => {
            bar.abandon();
            if cancel.load(Ordering::SeqCst) {
                println!("{}", style("Search stopped, no results written.").yellow());
            }
            return Err(e.into());
        }
    };

    println!(
        "{} {} matching block(s) in {} chunk(s)",
        style("Found").green().bold(),
        report.matches,
        report.chunks
    );
    println!("Results: {}", report.path.display());
    Ok(())
}
