pub mod atlas;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod packing;
pub mod skew;
pub mod sprite;

pub use atlas::{Atlas, AtlasBuilder};
pub use cli::{CliArgs, Command, CommonArgs, PackingHeuristic};
pub use error::SkewpackError;
pub use skew::{QuadMapping, SearchMode, SkewError, SkewedSprite, Transform, transform};
pub use sprite::{PackedSprite, SkewInfo, SourceSprite, TrimInfo, TrimMode};
