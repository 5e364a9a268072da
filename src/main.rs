use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde::Serialize;

use skewpack::atlas::AtlasBuilder;
use skewpack::cli::{CliArgs, Command, CommonArgs, CompressionLevel, InspectArgs, PackingHeuristic};
use skewpack::config::LoadedConfig;
use skewpack::output::{atlas_png_filename, save_atlas_image, write_json};
use skewpack::skew::{QuadMapping, SearchMode, Transform, transform_image};
use skewpack::sprite::{TrimMode, load_rgba_image, load_sprites};

#[allow(clippy::print_stderr)]
fn main() {
    if let Err(e) = run() {
        // Use eprintln instead of error! because logger may not be initialized
        // (e.g., config loading fails before logger init)
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = CliArgs::parse();

    match &cli.command {
        Command::Pack(args) => pack(args),
        Command::Inspect(args) => {
            init_logging(false);
            inspect(args)
        }
    }
}

fn init_logging(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn pack(args: &CommonArgs) -> Result<()> {
    // Load config if specified and merge with CLI args
    let merged = merge_config_with_args(args)?;

    init_logging(merged.verbose);

    info!("skewpack v{}", env!("CARGO_PKG_VERSION"));

    if !merged.output.exists() {
        fs::create_dir_all(&merged.output).with_context(|| {
            format!(
                "failed to create output directory: {}",
                merged.output.display()
            )
        })?;
    }

    let sprites = load_sprites(&merged.input, merged.trim_mode, merged.base_dir.as_deref())?;
    info!("Loaded {} sprites", sprites.len());

    let atlases = AtlasBuilder::new(merged.max_width, merged.max_height)
        .padding(merged.padding)
        .heuristic(merged.heuristic)
        .power_of_two(merged.pot)
        .debug_outline(merged.debug_outline)
        .build(sprites)?;

    for atlas in &atlases {
        let path = merged
            .output
            .join(atlas_png_filename(&merged.name, atlas.index, atlases.len()));
        save_atlas_image(atlas, &path, merged.compress)?;
        info!("Saved {}", path.display());
    }

    write_json(&atlases, &merged.output, &merged.name)?;
    info!("Generated {}.json", merged.name);

    info!("Done!");

    Ok(())
}

/// JSON report printed by `inspect`
#[derive(Serialize)]
struct InspectReport {
    image: PathBuf,
    source_width: u32,
    source_height: u32,
    packed_width: u32,
    packed_height: u32,
    transform: Transform,
    mapping: Option<QuadMapping>,
}

#[allow(clippy::print_stdout)]
fn inspect(args: &InspectArgs) -> Result<()> {
    let image = load_rgba_image(&args.image)?;
    let mode = if args.exhaustive {
        SearchMode::Exhaustive
    } else {
        SearchMode::Unimodal
    };

    let skewed = transform_image(&image, mode)
        .with_context(|| format!("failed to transform {}", args.image.display()))?;

    let t = &skewed.transform;
    info!(
        "{}: bounding box {}x{}, packed {}x{} (skew {}, {})",
        args.image.display(),
        t.bounding_w,
        t.bounding_h,
        skewed.width,
        skewed.height,
        skewed.skew_x,
        skewed.skew_y
    );

    let report = InspectReport {
        image: args.image.clone(),
        source_width: image.width(),
        source_height: image.height(),
        packed_width: skewed.width,
        packed_height: skewed.height,
        transform: skewed.transform,
        mapping: skewed.mapping,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Merged configuration from CLI args and optional config file.
struct MergedConfig {
    input: Vec<PathBuf>,
    /// Sprite names are relative to this directory for config-file inputs
    base_dir: Option<PathBuf>,
    output: PathBuf,
    name: String,
    max_width: u32,
    max_height: u32,
    padding: u32,
    trim_mode: TrimMode,
    heuristic: PackingHeuristic,
    pot: bool,
    debug_outline: bool,
    verbose: bool,
    compress: Option<CompressionLevel>,
}

/// Merge config file values with CLI arguments.
/// CLI arguments always take precedence over config values.
fn merge_config_with_args(args: &CommonArgs) -> Result<MergedConfig> {
    let loaded_config = match &args.config {
        Some(config_path) => Some(
            LoadedConfig::load(config_path)
                .with_context(|| format!("failed to load config: {}", config_path.display()))?,
        ),
        None => None,
    };
    let config = loaded_config.as_ref().map(|lc| &lc.config);

    // Determine input files: CLI args override config
    let (input, base_dir) = if !args.input.is_empty() {
        (args.input.clone(), None)
    } else if let Some(lc) = &loaded_config {
        let inputs = lc
            .resolve_inputs()
            .context("failed to resolve input files from config")?;
        (inputs, Some(lc.config_dir.clone()))
    } else {
        // clap's required_unless_present rules this out
        (Vec::new(), None)
    };

    let output = args.output.clone().unwrap_or_else(|| {
        loaded_config
            .as_ref()
            .map(|lc| lc.resolve_output_dir())
            .unwrap_or_else(|| PathBuf::from("."))
    });

    let name = args
        .name
        .clone()
        .or_else(|| config.map(|c| c.name.clone()))
        .unwrap_or_else(|| "atlas".to_string());

    // For numeric fields: CLI > config > default
    let max_width = args
        .max_width
        .or(config.map(|c| c.max_width))
        .unwrap_or(4096);
    let max_height = args
        .max_height
        .or(config.map(|c| c.max_height))
        .unwrap_or(4096);
    let padding = args.padding.or(config.map(|c| c.padding)).unwrap_or(1);

    // Boolean flags: CLI presence wins, otherwise use config
    let trim = !args.no_trim && config.is_none_or(|c| c.trim);
    let skew = !args.no_skew && config.is_none_or(|c| c.skew);
    let exhaustive = args.exhaustive || config.is_some_and(|c| c.exhaustive);
    let pot = args.pot || config.is_some_and(|c| c.pot);
    let debug_outline = args.debug_outline || config.is_some_and(|c| c.debug_outline);

    let trim_mode = match (trim, skew, exhaustive) {
        (false, _, _) => TrimMode::Keep,
        (true, false, _) => TrimMode::Trim,
        (true, true, false) => TrimMode::Skew,
        (true, true, true) => TrimMode::SkewExhaustive,
    };

    let heuristic = args
        .heuristic
        .or(config.map(|c| c.heuristic))
        .unwrap_or_default();

    let compress = match (args.compress, config.and_then(|c| c.compress.as_ref())) {
        (Some(level), _) => Some(level),
        (None, Some(c)) => Some(c.to_level().ok_or_else(|| {
            anyhow::anyhow!(
                "invalid compress value {:?} in config file. Valid values: 0-6, \"max\"",
                c
            )
        })?),
        (None, None) => None,
    };

    Ok(MergedConfig {
        input,
        base_dir,
        output,
        name,
        max_width,
        max_height,
        padding,
        trim_mode,
        heuristic,
        pot,
        debug_outline,
        verbose: args.verbose,
        compress,
    })
}
