use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::atlas::Atlas;
use crate::error::SkewpackError;
use crate::output::atlas_png_filename;
use crate::skew::QuadMapping;
use crate::sprite::{PackedSprite, SkewInfo};

#[derive(Serialize)]
struct JsonOutput {
    meta: Meta,
    atlases: Vec<JsonAtlas>,
}

#[derive(Serialize)]
struct Meta {
    app: &'static str,
    version: &'static str,
    format: &'static str,
}

#[derive(Serialize)]
struct JsonAtlas {
    image: String,
    size: Size,
    sprites: Vec<JsonSprite>,
}

#[derive(Serialize)]
struct Size {
    w: u32,
    h: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSprite {
    name: String,
    frame: Frame,
    trimmed: bool,
    sprite_source_size: Frame,
    source_size: Size,
    #[serde(skip_serializing_if = "Option::is_none")]
    skew: Option<JsonSkew>,
}

#[derive(Serialize)]
struct Frame {
    x: i32,
    y: i32,
    w: u32,
    h: u32,
}

/// Shear parameters plus the quad a renderer draws the frame into.
/// Screen corners are relative to the untrimmed source image.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSkew {
    skew_x: i64,
    skew_y: i64,
    offset_x: i64,
    offset_y: i64,
    mapping: QuadMapping,
}

impl From<&SkewInfo> for JsonSkew {
    fn from(skew: &SkewInfo) -> Self {
        Self {
            skew_x: skew.skew_x,
            skew_y: skew.skew_y,
            offset_x: skew.offset_x,
            offset_y: skew.offset_y,
            mapping: skew.mapping,
        }
    }
}

/// Write JSON metadata file
pub fn write_json(atlases: &[Atlas], output_dir: &Path, base_name: &str) -> Result<()> {
    let total = atlases.len();
    let json_atlases: Vec<_> = atlases
        .iter()
        .map(|atlas| JsonAtlas {
            image: atlas_png_filename(base_name, atlas.index, total),
            size: Size {
                w: atlas.width,
                h: atlas.height,
            },
            sprites: atlas.sprites.iter().map(sprite_to_json).collect(),
        })
        .collect();

    let output = JsonOutput {
        meta: Meta {
            app: "skewpack",
            version: env!("CARGO_PKG_VERSION"),
            format: "rgba8888",
        },
        atlases: json_atlases,
    };

    let json_path = output_dir.join(format!("{}.json", base_name));
    let content = serde_json::to_string_pretty(&output)?;

    fs::write(&json_path, content).map_err(|e| SkewpackError::OutputWrite {
        path: json_path,
        source: e,
    })?;

    Ok(())
}

fn sprite_to_json(sprite: &PackedSprite) -> JsonSprite {
    let trim = &sprite.trim_info;

    JsonSprite {
        name: sprite.name.clone(),
        frame: Frame {
            x: i32::try_from(sprite.x).unwrap_or(i32::MAX),
            y: i32::try_from(sprite.y).unwrap_or(i32::MAX),
            w: sprite.width,
            h: sprite.height,
        },
        trimmed: trim.was_trimmed(),
        sprite_source_size: Frame {
            x: trim.offset_x,
            y: trim.offset_y,
            w: trim.trimmed_width,
            h: trim.trimmed_height,
        },
        source_size: Size {
            w: trim.source_width,
            h: trim.source_height,
        },
        skew: sprite.skew.as_ref().map(JsonSkew::from),
    }
}
