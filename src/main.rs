//! # Piste-osm CLI
//!
//! Command-line interface for the piste-osm library.
//! Converts a SAC ski touring dataset into an OpenStreetMap XML file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, LevelFilter};
use piste_osm::{ConvertOptions, SacTranslation};

mod cli;

/// Command-line interface for piste-osm
#[derive(Parser)]
#[command(name = "piste-osm")]
#[command(about = "Converts SAC ski touring routes into OpenStreetMap piste data")]
#[command(long_about = "Converts SAC ski touring routes into OpenStreetMap piste data:
  piste-osm -i data/ski_routes.geojson -o out/ski_routes.osm
  piste-osm -i data/ski_network.geojson -o out/network.osm --dry-run

Every feature becomes a type=route + route=piste way; coincident
segments are merged into one way. Set RUST_LOG to control logging.")]
#[command(version = env!("PISTE_OSM_VERSION"))]
struct Cli {
    /// Input dataset (GeoJSON)
    #[arg(short, long, value_parser = existing_path)]
    input: PathBuf,

    /// Output OSM file; its directory is created if missing
    #[arg(short, long)]
    output: PathBuf,

    /// Translate everything but don't write the output file
    #[arg(long)]
    dry_run: bool,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Input paths must exist before any translation runs
fn existing_path(value: &str) -> std::result::Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("Missing {}", path.display()))
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        error!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

/// Process-wide logger setup; runs once, before any conversion work.
///
/// The pipeline stays quiet below `error` unless `--verbose` is given.
/// `RUST_LOG` overrides both.
fn init_logging(verbose: bool) {
    let crate_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Error
    };

    env_logger::Builder::new()
        .filter_level(LevelFilter::Error)
        .filter_module("piste_osm", crate_level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    if cli.verbose {
        eprintln!("🦋 Piste-osm v{} starting...", env!("PISTE_OSM_VERSION"));
    }

    println!(
        "▶ Converting {} -> {}...",
        cli.input.display(),
        cli.output.display()
    );

    // Length is set by the first progress callback, once the dataset is read
    let progress = if cli.no_progress || cli.dry_run {
        None
    } else {
        Some(cli::ProgressManager::new(0, "🗺️  Translating features"))
    };

    let options = ConvertOptions {
        progress: progress.as_ref().map(|p| p.callback()),
        dry_run: cli.dry_run,
    };

    let summary = piste_osm::convert(&cli.input, &cli.output, &SacTranslation::new(), &options)
        .with_context(|| format!("Failed to convert {}", cli.input.display()))?;

    if let Some(progress) = progress {
        progress.pb.finish_and_clear();
    }

    if cli.dry_run {
        eprintln!("🔍 [DRY RUN] Would write {}", cli.output.display());
    }
    println!(
        "✅ {} features -> {} ways, {} nodes ({} merged, {} skipped, {} filtered)",
        summary.features,
        summary.ways,
        summary.nodes,
        summary.merged,
        summary.skipped,
        summary.filtered
    );

    Ok(())
}
