mod loader;
mod sprite;
mod trimmer;

pub use loader::{load_rgba_image, load_sprites};
pub use sprite::{PackedSprite, SkewInfo, SourceSprite, TrimInfo};
pub use trimmer::{TrimMode, skew_sprite, trim_sprite};
