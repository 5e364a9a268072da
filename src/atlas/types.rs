use image::RgbaImage;

use crate::sprite::PackedSprite;

/// A completed texture atlas page
#[derive(Debug)]
pub struct Atlas {
    /// Page index (for multi-atlas support)
    pub index: usize,
    /// Atlas width
    pub width: u32,
    /// Atlas height
    pub height: u32,
    /// Rendered atlas image
    pub image: RgbaImage,
    /// All sprites packed into this page
    pub sprites: Vec<PackedSprite>,
    /// Fraction of the page covered by sprites and their padding
    pub occupancy: f64,
}

impl Atlas {
    pub fn new(index: usize, width: u32, height: u32) -> Self {
        Self {
            index,
            width,
            height,
            image: RgbaImage::new(width, height),
            sprites: Vec::new(),
            occupancy: 0.0,
        }
    }

    /// Number of sprites on this page that were skew-packed
    pub fn skewed_count(&self) -> usize {
        self.sprites.iter().filter(|s| s.skew.is_some()).count()
    }
}
