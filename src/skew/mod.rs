//! Minimal-area skew transform of sprite images.
//!
//! [`transform`] finds the horizontal and vertical shear that packs a sprite's
//! opaque pixels into the smallest rectangle, resamples the pixels into it,
//! and returns the [`QuadMapping`] a renderer needs to draw the packed texture
//! back in place.
//!
//! Every call works on its own buffers; sprites can be transformed in
//! parallel.

mod bitmap;
mod error;
mod mapping;
mod resample;
mod search;
mod segment;

pub use bitmap::{Bitmap, PIXEL_SIZE};
pub use error::{SkewError, SkewResult};
pub use mapping::QuadMapping;
pub use resample::{Shift, resample, shear_lines, shear_pixels, transpose};
pub use search::{
    AxisSkew, SearchMode, Sheared, Transform, apply_shear, find_best_skew, find_min_skew,
};
pub use segment::{
    Segment, Segments, TrimmedSegments, extract_segments, min_segment, rotate_segments,
};

use image::RgbaImage;

/// A sprite resampled into its minimal skewed rectangle
#[derive(Debug, Clone)]
pub struct SkewedSprite {
    /// Packed pixels, `width x height`
    pub content: RgbaImage,
    pub width: u32,
    pub height: u32,
    pub skew_x: i64,
    pub skew_y: i64,
    pub offset_x: i64,
    pub offset_y: i64,
    /// `None` when the sprite has no opaque pixel
    pub mapping: Option<QuadMapping>,
    /// Full search result, including the trim box
    pub transform: Transform,
}

impl SkewedSprite {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Transform a tightly packed `width x height` RGBA8 buffer
pub fn transform(width: u32, height: u32, pixels: &[u8]) -> SkewResult<SkewedSprite> {
    let bitmap = Bitmap::new(width, height, pixels)?;
    transform_bitmap(&bitmap, SearchMode::default())
}

/// Transform an image with the given search mode
pub fn transform_image(image: &RgbaImage, mode: SearchMode) -> SkewResult<SkewedSprite> {
    transform_bitmap(&Bitmap::from_image(image), mode)
}

pub fn transform_bitmap(bitmap: &Bitmap<'_>, mode: SearchMode) -> SkewResult<SkewedSprite> {
    let lines = extract_segments(bitmap);
    let transform = find_best_skew(&lines, mode);
    let content = resample(bitmap, &transform)?;

    Ok(SkewedSprite {
        width: content.width(),
        height: content.height(),
        content,
        skew_x: transform.skew_x,
        skew_y: transform.skew_y,
        offset_x: transform.skew_offx,
        offset_y: transform.skew_offy,
        mapping: QuadMapping::from_transform(&transform),
        transform,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_rejects_wrong_buffer_length() {
        let pixels = vec![0u8; 10];

        let err = transform(2, 2, &pixels).unwrap_err();

        assert!(matches!(
            err,
            SkewError::InvalidBufferSize {
                expected: 16,
                actual: 10,
                ..
            }
        ));
    }

    #[test]
    fn test_transform_fully_transparent() {
        let pixels = vec![0u8; 8 * 8 * 4];

        let sprite = transform(8, 8, &pixels).unwrap();

        assert!(sprite.is_empty());
        assert_eq!((sprite.width, sprite.height), (0, 0));
        assert!(sprite.content.as_raw().is_empty());
        assert!(sprite.mapping.is_none());
    }

    #[test]
    fn test_transform_zero_sized_image() {
        let sprite = transform(0, 0, &[]).unwrap();

        assert!(sprite.is_empty());
        assert!(sprite.mapping.is_none());
    }
}
