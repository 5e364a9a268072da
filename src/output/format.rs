use std::fs;
use std::io::Cursor;
use std::path::Path;

use anyhow::Result;
use image::ImageFormat;

use crate::atlas::Atlas;
use crate::cli::CompressionLevel;
use crate::error::SkewpackError;

/// Save atlas image as PNG, optionally optimized with oxipng
pub fn save_atlas_image(
    atlas: &Atlas,
    path: &Path,
    compress: Option<CompressionLevel>,
) -> Result<()> {
    let mut png_data = Cursor::new(Vec::new());
    atlas
        .image
        .write_to(&mut png_data, ImageFormat::Png)
        .map_err(|e| SkewpackError::ImageSave {
            path: path.to_path_buf(),
            source: e,
        })?;

    let output_data = match compress {
        Some(level) => {
            let opts = match level {
                CompressionLevel::Level(n) => oxipng::Options::from_preset(n),
                CompressionLevel::Max => oxipng::Options::max_compression(),
            };
            oxipng::optimize_from_memory(&png_data.into_inner(), &opts).map_err(|e| {
                SkewpackError::PngCompress {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            })?
        }
        None => png_data.into_inner(),
    };

    fs::write(path, output_data).map_err(|e| SkewpackError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
