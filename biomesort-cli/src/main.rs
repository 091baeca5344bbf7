//! biomesort CLI - Command-line interface
//!
//! Sorts `{x}_{z}_{id}.png` screenshots into per-biome folders using the
//! biome data of a Minecraft world.

mod error;
mod runner;

use biomesort::config::expand_tilde;
use biomesort::pipeline::{sort_screenshots, PipelineConfig};
use biomesort::store::{AnvilOpener, Dimension};
use clap::{Parser, ValueEnum};
use error::CliError;
use runner::CliRunner;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DimensionArg {
    /// The overworld (region/)
    Overworld,
    /// The nether (DIM-1/region/)
    Nether,
    /// The end (DIM1/region/)
    End,
}

impl From<DimensionArg> for Dimension {
    fn from(arg: DimensionArg) -> Self {
        match arg {
            DimensionArg::Overworld => Dimension::Overworld,
            DimensionArg::Nether => Dimension::Nether,
            DimensionArg::End => Dimension::End,
        }
    }
}

#[derive(Parser)]
#[command(name = "biomesort")]
#[command(version = biomesort::VERSION)]
#[command(about = "Sort {x}_{z}_{id}.png screenshots into folders by biome", long_about = None)]
struct Args {
    /// Path to the Minecraft world directory
    #[arg(long)]
    world: PathBuf,

    /// Folder containing the PNG screenshots
    #[arg(long)]
    src: PathBuf,

    /// Destination parent folder for biome directories
    #[arg(long)]
    out: PathBuf,

    /// Dimension to read biomes from (default: from config, else overworld)
    #[arg(long, value_enum)]
    dimension: Option<DimensionArg>,

    /// Open the world in place instead of copying a snapshot
    #[arg(long)]
    no_snapshot: bool,

    /// Print actions only; do not move files
    #[arg(long)]
    dry_run: bool,

    /// Number of chunk biome grids kept in memory (0 disables caching)
    #[arg(long)]
    cache_capacity: Option<usize>,

    /// Abort after this many failed lookups
    #[arg(long)]
    max_lookup_failures: Option<usize>,

    /// Config file to use instead of ~/.biomesort/config.ini
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        e.exit();
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let config_path = args.config.as_deref().map(expand_path);
    let runner = CliRunner::new(config_path.as_deref(), args.debug)?;
    runner.log_startup();
    let config = runner.config();

    let mut session_config = config.session.to_session_config();
    if let Some(dimension) = args.dimension {
        session_config = session_config.with_dimension(dimension.into());
    }
    if let Some(capacity) = args.cache_capacity {
        session_config = session_config.with_cache_capacity(capacity);
    }
    if args.no_snapshot {
        session_config = session_config.with_snapshot(false);
    }

    let pipeline_config = PipelineConfig::new(expand_path(&args.src), expand_path(&args.out))
        .with_dry_run(args.dry_run)
        .with_max_lookup_failures(
            args.max_lookup_failures
                .or(config.pipeline.max_lookup_failures),
        );

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        cancel_flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| CliError::Signal(e.to_string()))?;

    let summary = sort_screenshots(
        &expand_path(&args.world),
        &session_config,
        pipeline_config,
        &AnvilOpener,
        Some(cancel),
    )?;

    if summary.cancelled {
        info!("Interrupted, world session released");
    }
    println!();
    println!("{}", summary);

    Ok(())
}

fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => expand_tilde(s),
        None => path.to_path_buf(),
    }
}
