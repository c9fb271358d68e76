use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

use sprite_collide::atlas::{AtlasLoader, Cell};
use sprite_collide::cli::{CheckArgs, CliArgs, Command, MaskArgs};
use sprite_collide::collision::collide_pairs;
use sprite_collide::config::LoadedConfig;
use sprite_collide::mask::{DEFAULT_OPACITY_THRESHOLD, write_mask_image};

#[allow(clippy::print_stderr)]
fn main() {
    if let Err(e) = run() {
        // Use eprintln instead of error! because logger may not be initialized
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = CliArgs::parse();

    let verbose = match &cli.command {
        Command::Check(args) => args.verbose,
        Command::Mask(args) => args.verbose,
    };

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp(None)
        .format_target(false)
        .init();

    info!("Sprite collide v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Command::Check(args) => run_check(args),
        Command::Mask(args) => run_mask(args),
    }
}

fn run_check(args: &CheckArgs) -> Result<()> {
    let loaded = LoadedConfig::load(&args.scene)
        .with_context(|| format!("failed to load scene: {}", args.scene.display()))?;

    // Threshold: CLI > scene > default
    let threshold = args.threshold.unwrap_or(loaded.config.opacity_threshold);

    let atlases = AtlasLoader::new()
        .opacity_threshold(threshold)
        .load_all(&loaded.atlas_sources())?;
    let sprites = loaded.resolve_sprites(&atlases)?;
    info!(
        "Loaded {} atlases and {} sprites",
        atlases.len(),
        sprites.len()
    );

    let mut names = Vec::new();
    let mut pairs = Vec::new();
    for (i, a) in sprites.iter().enumerate() {
        for b in &sprites[i + 1..] {
            names.push((a.name.as_str(), b.name.as_str()));
            pairs.push((a.sprite, b.sprite));
        }
    }

    let results = collide_pairs(&pairs)?;

    let mut hits = 0;
    for ((a, b), hit) in names.iter().zip(&results) {
        if *hit {
            hits += 1;
            info!("{} collides with {}", a, b);
        } else {
            debug!("{} misses {}", a, b);
        }
    }

    info!("{} of {} pairs collide", hits, results.len());

    Ok(())
}

fn run_mask(args: &MaskArgs) -> Result<()> {
    let threshold = args.threshold.unwrap_or(DEFAULT_OPACITY_THRESHOLD);

    let name = args
        .image
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("atlas")
        .to_string();
    let atlas = AtlasLoader::new().opacity_threshold(threshold).load(
        name,
        &args.image,
        args.columns,
        args.rows,
    )?;
    let mask = atlas.ensure_mask()?;
    let layout = atlas.layout();

    for row in 0..layout.rows {
        for column in 0..layout.columns {
            let rect = layout.cell_rect(Cell::new(column, row));
            info!(
                "Cell ({}, {}): {} of {} texels opaque",
                column,
                row,
                mask.opaque_count_in(&rect),
                rect.area()
            );
        }
    }

    info!(
        "{}: {} of {} texels opaque at threshold {}",
        atlas.name(),
        mask.opaque_count(),
        u64::from(atlas.width()) * u64::from(atlas.height()),
        threshold
    );

    if let Some(output) = &args.output {
        write_mask_image(mask, output)?;
        info!("Saved {}", output.display());
    }

    Ok(())
}
