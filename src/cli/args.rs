use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "skewpack")]
#[command(version, about = "Sprite atlas packer with minimal-area skew", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Pack sprites into atlas pages with JSON metadata
    Pack(CommonArgs),
    /// Print the skew transform of a single image as JSON
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Input image files or directories
    #[arg(required_unless_present = "config")]
    pub input: Vec<PathBuf>,

    /// Load settings from a JSON config file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output directory for atlas files [default: .]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Base name for output files (atlas_0.png, atlas.json, etc.) [default: atlas]
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Maximum atlas width in pixels [default: 4096]
    #[arg(long)]
    pub max_width: Option<u32>,

    /// Maximum atlas height in pixels [default: 4096]
    #[arg(long)]
    pub max_height: Option<u32>,

    /// Padding between sprites in pixels [default: 1]
    #[arg(short, long)]
    pub padding: Option<u32>,

    /// Disable sprite trimming (implies --no-skew)
    #[arg(long)]
    pub no_trim: bool,

    /// Trim to the bounding box without shearing
    #[arg(long)]
    pub no_skew: bool,

    /// Try every shear candidate instead of stopping at the first local minimum
    #[arg(long, conflicts_with = "no_skew")]
    pub exhaustive: bool,

    /// Packing heuristic to use [default: best-short-side-fit]
    #[arg(long, value_enum)]
    pub heuristic: Option<PackingHeuristic>,

    /// Force power-of-two atlas dimensions
    #[arg(long)]
    pub pot: bool,

    /// Draw a white outline around every placed sprite
    #[arg(long)]
    pub debug_outline: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Compress PNG output (0-6 or 'max'). Default level is 2 if flag is present without value.
    #[arg(long, value_name = "LEVEL", default_missing_value = "2", num_args = 0..=1)]
    pub compress: Option<CompressionLevel>,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Image to analyze
    pub image: PathBuf,

    /// Try every shear candidate
    #[arg(long)]
    pub exhaustive: bool,
}

/// PNG compression level (0-6 or max)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression
    Max,
}

impl std::str::FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("max") {
            return Ok(CompressionLevel::Max);
        }
        let n = s
            .parse::<u8>()
            .map_err(|_e| format!("invalid compression level: {}", s))?;
        if n <= 6 {
            Ok(CompressionLevel::Level(n))
        } else {
            Err(format!("compression level must be 0-6 or 'max', got {}", n))
        }
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        CompressionLevel::Level(2)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackingHeuristic {
    /// Best Short Side Fit - minimizes the shorter leftover side
    #[default]
    #[value(name = "best-short-side-fit")]
    BestShortSideFit,
    /// Best Long Side Fit - minimizes the longer leftover side
    #[value(name = "best-long-side-fit")]
    BestLongSideFit,
    /// Best Area Fit - picks the smallest free rectangle
    #[value(name = "best-area-fit")]
    BestAreaFit,
    /// Bottom Left - Tetris-style packing
    #[value(name = "bottom-left")]
    BottomLeft,
    /// Best - tries all heuristics and picks the most efficient result
    #[value(name = "best")]
    Best,
}
