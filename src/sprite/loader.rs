use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageReader, RgbaImage};
use log::{debug, info, warn};
use rayon::prelude::*;

use super::{SourceSprite, TrimInfo, TrimMode, skew_sprite, trim_sprite};
use crate::error::SkewpackError;
use crate::skew::SearchMode;

const SUPPORTED_EXTENSIONS: &[&str] = &["png", "tga", "bmp", "gif", "webp", "tiff"];

/// Image path with its base directory for computing relative paths
struct ImagePath {
    path: std::path::PathBuf,
    base: Option<std::path::PathBuf>,
}

/// Load sprites from input paths (files or directories)
///
/// When `base_dir` is provided, individual file inputs will have their sprite
/// names computed as paths relative to that directory. This preserves subdirectory
/// structure in output metadata (e.g., "hero/run_0.png" instead of "run_0.png").
/// Config-file loading uses this to pass the config directory as the base.
///
/// Sprites are decoded and transformed in parallel and returned largest first.
pub fn load_sprites(
    inputs: &[impl AsRef<Path>],
    mode: TrimMode,
    base_dir: Option<&Path>,
) -> Result<Vec<SourceSprite>> {
    let image_paths = collect_image_paths(inputs, base_dir)?;

    if image_paths.is_empty() {
        return Err(SkewpackError::NoImages.into());
    }

    info!("Loading {} images...", image_paths.len());

    let sprites: Result<Vec<_>> = image_paths
        .par_iter()
        .map(|img_path| load_single_sprite(&img_path.path, img_path.base.as_deref(), mode))
        .collect();

    let mut sprites = sprites?;
    sprites.sort_by(|a, b| {
        // Sort by area descending for better packing
        let area_a = u64::from(a.width()) * u64::from(a.height());
        let area_b = u64::from(b.width()) * u64::from(b.height());
        area_b.cmp(&area_a)
    });

    let skewed = sprites.iter().filter(|s| s.skew.is_some()).count();
    if skewed > 0 {
        info!("Skew-packed {} of {} sprites", skewed, sprites.len());
    }

    Ok(sprites)
}

fn collect_image_paths(
    inputs: &[impl AsRef<Path>],
    base_dir: Option<&Path>,
) -> Result<Vec<ImagePath>> {
    let mut paths = Vec::new();

    for input in inputs {
        let path = input.as_ref();
        if !path.exists() {
            return Err(SkewpackError::InputNotFound(path.to_path_buf()).into());
        }

        if path.is_file() {
            if is_supported_image(path) {
                paths.push(ImagePath {
                    path: path.to_path_buf(),
                    base: base_dir.map(Path::to_path_buf),
                });
            }
        } else if path.is_dir() {
            collect_from_directory(path, path, &mut paths)?;
        }
    }

    // Directory listing order is platform dependent
    paths.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(paths)
}

fn collect_from_directory(base: &Path, dir: &Path, paths: &mut Vec<ImagePath>) -> Result<()> {
    for entry in std::fs::read_dir(dir).context("Failed to read directory")? {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() && is_supported_image(&path) {
            paths.push(ImagePath {
                path,
                base: Some(base.to_path_buf()),
            });
        } else if path.is_dir() {
            collect_from_directory(base, &path, paths)?;
        }
    }

    Ok(())
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Sprite name: relative path for directory inputs, filename otherwise
fn sprite_name(path: &Path, base: Option<&Path>) -> String {
    match base {
        Some(base_dir) => path
            .strip_prefix(base_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/"),
        None => path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string(),
    }
}

/// Decode an image file, rejecting sources without an alpha channel
pub fn load_rgba_image(path: &Path) -> Result<RgbaImage> {
    let decoded = ImageReader::open(path)
        .map_err(|e| SkewpackError::ImageLoad {
            path: path.to_path_buf(),
            source: e.into(),
        })?
        .decode()
        .map_err(|e| SkewpackError::ImageLoad {
            path: path.to_path_buf(),
            source: e,
        })?;

    // The skew search keys on alpha
    let channels = decoded.color().channel_count();
    if channels != 4 {
        return Err(SkewpackError::NotRgba {
            path: path.to_path_buf(),
            channels,
        }
        .into());
    }

    Ok(decoded.into_rgba8())
}

fn load_single_sprite(path: &Path, base: Option<&Path>, mode: TrimMode) -> Result<SourceSprite> {
    let img = load_rgba_image(path)?;
    let name = sprite_name(path, base);

    let (image, trim_info, skew) = match mode {
        TrimMode::Keep => {
            let (w, h) = img.dimensions();
            (img, TrimInfo::untrimmed(w, h), None)
        }
        TrimMode::Trim => {
            let (image, trim_info) = trim_sprite(&img);
            (image, trim_info, None)
        }
        TrimMode::Skew | TrimMode::SkewExhaustive => {
            let search = if mode == TrimMode::SkewExhaustive {
                SearchMode::Exhaustive
            } else {
                SearchMode::Unimodal
            };
            skew_sprite(&img, search).map_err(|source| SkewpackError::Transform {
                name: name.clone(),
                source,
            })?
        }
    };

    if image.pixels().all(|p| p[3] == 0) {
        warn!("Sprite '{}' is fully transparent", name);
    }
    if let Some(skew) = &skew {
        debug!(
            "Skewed '{}': {}x{} -> {}x{} (skew {}, {})",
            name,
            trim_info.trimmed_width,
            trim_info.trimmed_height,
            image.width(),
            image.height(),
            skew.skew_x,
            skew.skew_y
        );
    }

    Ok(SourceSprite {
        path: path.to_path_buf(),
        name,
        image,
        trim_info,
        skew,
    })
}
