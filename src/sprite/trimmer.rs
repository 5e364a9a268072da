use image::RgbaImage;

use super::{SkewInfo, TrimInfo};
use crate::skew::{Bitmap, SearchMode, SkewResult, extract_segments, min_segment, transform_image};

/// How a sprite's transparent border is handled before packing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrimMode {
    /// Pack the whole image
    Keep,
    /// Crop to the bounding box of opaque pixels
    Trim,
    /// Shear into the smallest rectangle holding the opaque pixels
    #[default]
    Skew,
    /// Like `Skew`, trying every shear candidate
    SkewExhaustive,
}

/// Placeholder for a sprite without opaque pixels
fn transparent(width: u32, height: u32) -> (RgbaImage, TrimInfo) {
    (
        RgbaImage::new(1, 1),
        TrimInfo {
            offset_x: 0,
            offset_y: 0,
            source_width: width,
            source_height: height,
            trimmed_width: 1,
            trimmed_height: 1,
        },
    )
}

fn clamp_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn clamp_u32(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Trim transparent borders from an image
pub fn trim_sprite(image: &RgbaImage) -> (RgbaImage, TrimInfo) {
    let (width, height) = image.dimensions();

    let trimmed = min_segment(&extract_segments(&Bitmap::from_image(image)));
    if trimmed.is_empty() {
        return transparent(width, height);
    }

    let (x, y) = (clamp_u32(trimmed.offset_x), clamp_u32(trimmed.offset_y));
    let (trimmed_width, trimmed_height) = (clamp_u32(trimmed.width), clamp_u32(trimmed.height()));

    let cropped = image::imageops::crop_imm(image, x, y, trimmed_width, trimmed_height).to_image();

    let trim_info = TrimInfo {
        offset_x: clamp_i32(trimmed.offset_x),
        offset_y: clamp_i32(trimmed.offset_y),
        source_width: width,
        source_height: height,
        trimmed_width,
        trimmed_height,
    };

    (cropped, trim_info)
}

/// Shear an image into its minimal-area rectangle
///
/// The trim info describes the unskewed bounding box; the returned image is
/// the packed content. Sprites that cannot be made smaller come back as a
/// plain crop with no skew info.
pub fn skew_sprite(
    image: &RgbaImage,
    mode: SearchMode,
) -> SkewResult<(RgbaImage, TrimInfo, Option<SkewInfo>)> {
    let (width, height) = image.dimensions();
    let skewed = transform_image(image, mode)?;

    let Some(mapping) = skewed.mapping else {
        let (image, trim_info) = transparent(width, height);
        return Ok((image, trim_info, None));
    };

    let t = skewed.transform;
    let trim_info = TrimInfo {
        offset_x: clamp_i32(t.bounding_x),
        offset_y: clamp_i32(t.bounding_y),
        source_width: width,
        source_height: height,
        trimmed_width: clamp_u32(t.bounding_w),
        trimmed_height: clamp_u32(t.bounding_h),
    };

    let skew = (!t.is_identity()).then_some(SkewInfo {
        skew_x: skewed.skew_x,
        skew_y: skewed.skew_y,
        offset_x: skewed.offset_x,
        offset_y: skewed.offset_y,
        mapping,
    });

    Ok((skewed.content, trim_info, skew))
}
