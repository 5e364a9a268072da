use anyhow::Result;
use image::{Rgba, RgbaImage, imageops};
use log::{debug, info};

use super::Atlas;
use crate::cli::PackingHeuristic;
use crate::error::SkewpackError;
use crate::packing::MaxRectsPacker;
use crate::sprite::{PackedSprite, SourceSprite};

/// All concrete heuristics to try when using "Best" mode
const ALL_HEURISTICS: [PackingHeuristic; 4] = [
    PackingHeuristic::BestShortSideFit,
    PackingHeuristic::BestLongSideFit,
    PackingHeuristic::BestAreaFit,
    PackingHeuristic::BottomLeft,
];

const OUTLINE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Configuration for atlas building
pub struct AtlasBuilder {
    pub max_width: u32,
    pub max_height: u32,
    pub padding: u32,
    pub heuristic: PackingHeuristic,
    pub power_of_two: bool,
    pub debug_outline: bool,
}

/// Where one sprite landed on the page
struct SpritePlacement {
    sprite_index: usize,
    x: u32,
    y: u32,
}

/// Result of trying a packing heuristic
struct PackingLayout {
    heuristic: PackingHeuristic,
    placements: Vec<SpritePlacement>,
    unpacked_indices: Vec<usize>,
    max_x: u32,
    max_y: u32,
    occupancy: f64,
}

impl PackingLayout {
    /// Returns true if this layout is better than another.
    /// Priority: 1) more sprites packed, 2) smaller atlas area, 3) higher occupancy.
    fn is_better_than(&self, other: &PackingLayout) -> bool {
        let self_packed = self.placements.len();
        let other_packed = other.placements.len();

        if self_packed != other_packed {
            return self_packed > other_packed;
        }

        let self_area = u64::from(self.max_x) * u64::from(self.max_y);
        let other_area = u64::from(other.max_x) * u64::from(other.max_y);

        if self_area != other_area {
            return self_area < other_area;
        }

        self.occupancy > other.occupancy
    }
}

impl AtlasBuilder {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
            padding: 1,
            heuristic: PackingHeuristic::BestShortSideFit,
            power_of_two: false,
            debug_outline: false,
        }
    }

    pub fn padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    pub fn heuristic(mut self, heuristic: PackingHeuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn power_of_two(mut self, pot: bool) -> Self {
        self.power_of_two = pot;
        self
    }

    pub fn debug_outline(mut self, outline: bool) -> Self {
        self.debug_outline = outline;
        self
    }

    fn padded_size(&self, sprite: &SourceSprite) -> (u32, u32) {
        (
            sprite.width().saturating_add(self.padding.saturating_mul(2)),
            sprite.height().saturating_add(self.padding.saturating_mul(2)),
        )
    }

    /// Build atlas pages from the given sprites
    ///
    /// Sprites are placed in the given order; whatever does not fit a page
    /// rolls over to the next one until everything is placed.
    pub fn build(&self, sprites: Vec<SourceSprite>) -> Result<Vec<Atlas>> {
        if sprites.is_empty() {
            return Err(SkewpackError::NoImages.into());
        }

        for sprite in &sprites {
            let (padded_w, padded_h) = self.padded_size(sprite);

            if padded_w > self.max_width || padded_h > self.max_height {
                return Err(SkewpackError::SpriteTooLarge {
                    name: sprite.name.clone(),
                    width: sprite.width(),
                    height: sprite.height(),
                    max_width: self.max_width,
                    max_height: self.max_height,
                }
                .into());
            }
        }

        let mut atlases = Vec::new();
        let mut remaining = sprites;

        while !remaining.is_empty() {
            let (atlas, unpacked) = self.pack_atlas(atlases.len(), remaining);
            atlases.push(atlas);
            remaining = unpacked;
        }

        info!(
            "Created {} atlas(es) with {} total sprites",
            atlases.len(),
            atlases.iter().map(|a| a.sprites.len()).sum::<usize>()
        );

        Ok(atlases)
    }

    fn pack_atlas(&self, index: usize, sprites: Vec<SourceSprite>) -> (Atlas, Vec<SourceSprite>) {
        let layout = if self.heuristic == PackingHeuristic::Best {
            self.find_best_layout(&sprites)
        } else {
            self.try_pack(&sprites, self.heuristic)
        };

        self.apply_layout(index, sprites, layout)
    }

    /// Place sprites with one heuristic without rendering anything
    fn try_pack(&self, sprites: &[SourceSprite], heuristic: PackingHeuristic) -> PackingLayout {
        let mut packer = MaxRectsPacker::new(self.max_width, self.max_height);
        let mut placements = Vec::new();
        let mut unpacked_indices = Vec::new();
        let mut max_x = 0u32;
        let mut max_y = 0u32;

        for (i, sprite) in sprites.iter().enumerate() {
            let (padded_w, padded_h) = self.padded_size(sprite);

            if let Some(rect) = packer.insert(padded_w, padded_h, heuristic) {
                max_x = max_x.max(rect.right());
                max_y = max_y.max(rect.bottom());

                placements.push(SpritePlacement {
                    sprite_index: i,
                    x: rect.x + self.padding,
                    y: rect.y + self.padding,
                });
            } else {
                unpacked_indices.push(i);
            }
        }

        PackingLayout {
            heuristic,
            placements,
            unpacked_indices,
            max_x,
            max_y,
            occupancy: packer.occupancy(),
        }
    }

    fn find_best_layout(&self, sprites: &[SourceSprite]) -> PackingLayout {
        let mut best = self.try_pack(sprites, ALL_HEURISTICS[0]);

        for &heuristic in &ALL_HEURISTICS[1..] {
            let layout = self.try_pack(sprites, heuristic);
            debug!(
                "Heuristic {:?}: packed {}/{}, occupancy {:.1}%",
                heuristic,
                layout.placements.len(),
                sprites.len(),
                layout.occupancy * 100.0
            );
            if layout.is_better_than(&best) {
                best = layout;
            }
        }

        best
    }

    /// Render a computed layout into the final page
    fn apply_layout(
        &self,
        index: usize,
        sprites: Vec<SourceSprite>,
        layout: PackingLayout,
    ) -> (Atlas, Vec<SourceSprite>) {
        let (final_width, final_height) = if self.power_of_two {
            (
                next_power_of_two(layout.max_x),
                next_power_of_two(layout.max_y),
            )
        } else {
            (layout.max_x, layout.max_y)
        };

        let mut atlas = Atlas::new(index, final_width, final_height);
        atlas.occupancy = layout.occupancy;

        let mut sprites: Vec<Option<SourceSprite>> = sprites.into_iter().map(Some).collect();

        for placement in &layout.placements {
            let Some(source) = sprites[placement.sprite_index].take() else {
                continue;
            };

            imageops::replace(
                &mut atlas.image,
                &source.image,
                i64::from(placement.x),
                i64::from(placement.y),
            );
            if self.debug_outline {
                draw_outline(
                    &mut atlas.image,
                    placement.x,
                    placement.y,
                    source.width(),
                    source.height(),
                );
            }

            atlas.sprites.push(PackedSprite {
                x: placement.x,
                y: placement.y,
                width: source.width(),
                height: source.height(),
                name: source.name,
                trim_info: source.trim_info,
                skew: source.skew,
                atlas_index: index,
            });
        }

        let unpacked: Vec<_> = layout
            .unpacked_indices
            .iter()
            .filter_map(|&i| sprites[i].take())
            .collect();

        let heuristic_info = if self.heuristic == PackingHeuristic::Best {
            format!(" (best: {:?})", layout.heuristic)
        } else {
            String::new()
        };

        info!(
            "Atlas {}: {}x{} with {} sprites, {} skewed ({:.1}% efficiency){}",
            index,
            final_width,
            final_height,
            atlas.sprites.len(),
            atlas.skewed_count(),
            layout.occupancy * 100.0,
            heuristic_info,
        );

        (atlas, unpacked)
    }
}

/// One-pixel rectangle along the edges of a placed sprite
fn draw_outline(image: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32) {
    if width == 0 || height == 0 {
        return;
    }
    let (right, bottom) = (x + width - 1, y + height - 1);

    for px in x..=right {
        image.put_pixel(px, y, OUTLINE);
        image.put_pixel(px, bottom, OUTLINE);
    }
    for py in y..=bottom {
        image.put_pixel(x, py, OUTLINE);
        image.put_pixel(right, py, OUTLINE);
    }
}

fn next_power_of_two(n: u32) -> u32 {
    if n == 0 {
        return 1;
    }
    let mut v = n - 1;
    v |= v >> 1;
    v |= v >> 2;
    v |= v >> 4;
    v |= v >> 8;
    v |= v >> 16;
    v + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::TrimInfo;

    fn solid_sprite(name: &str, width: u32, height: u32, color: [u8; 4]) -> SourceSprite {
        SourceSprite {
            path: std::path::PathBuf::from(format!("{}.png", name)),
            name: name.to_string(),
            image: RgbaImage::from_pixel(width, height, Rgba(color)),
            trim_info: TrimInfo::untrimmed(width, height),
            skew: None,
        }
    }

    #[test]
    fn test_next_power_of_two() {
        assert_eq!(next_power_of_two(0), 1);
        assert_eq!(next_power_of_two(1), 1);
        assert_eq!(next_power_of_two(2), 2);
        assert_eq!(next_power_of_two(3), 4);
        assert_eq!(next_power_of_two(5), 8);
        assert_eq!(next_power_of_two(100), 128);
        assert_eq!(next_power_of_two(1000), 1024);
    }

    #[test]
    fn test_padding_offsets_sprite() {
        let sprites = vec![solid_sprite("hero", 4, 4, [255, 0, 0, 255])];

        let atlases = AtlasBuilder::new(256, 256).padding(1).build(sprites).unwrap();

        assert_eq!(atlases.len(), 1);
        let packed = &atlases[0].sprites[0];
        assert_eq!((packed.x, packed.y), (1, 1));
        assert_eq!((atlases[0].width, atlases[0].height), (6, 6));
        assert_eq!(atlases[0].image.get_pixel(0, 0)[3], 0);
        assert_eq!(*atlases[0].image.get_pixel(1, 1), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_power_of_two_pages() {
        let sprites = vec![solid_sprite("a", 5, 3, [1, 2, 3, 255])];

        let atlases = AtlasBuilder::new(64, 64)
            .padding(1)
            .power_of_two(true)
            .build(sprites)
            .unwrap();

        assert_eq!((atlases[0].width, atlases[0].height), (8, 8));
    }

    #[test]
    fn test_overflow_rolls_onto_new_page() {
        let sprites = (0..3)
            .map(|i| solid_sprite(&format!("s{}", i), 30, 30, [9, 9, 9, 255]))
            .collect();

        let atlases = AtlasBuilder::new(64, 32).padding(1).build(sprites).unwrap();

        assert_eq!(atlases.len(), 2);
        assert_eq!(atlases[0].sprites.len(), 2);
        assert_eq!(atlases[1].sprites.len(), 1);
        assert_eq!(atlases[1].index, 1);
        assert!(atlases[1].sprites.iter().all(|s| s.atlas_index == 1));
    }

    #[test]
    fn test_sprite_too_large() {
        let sprites = vec![solid_sprite("huge", 64, 10, [0, 0, 0, 255])];

        let err = AtlasBuilder::new(64, 64).padding(1).build(sprites).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SkewpackError>(),
            Some(SkewpackError::SpriteTooLarge { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(AtlasBuilder::new(64, 64).build(Vec::new()).is_err());
    }

    #[test]
    fn test_debug_outline() {
        let sprites = vec![solid_sprite("box", 5, 4, [10, 20, 30, 255])];

        let atlases = AtlasBuilder::new(64, 64)
            .padding(0)
            .debug_outline(true)
            .build(sprites)
            .unwrap();
        let image = &atlases[0].image;

        assert_eq!(*image.get_pixel(0, 0), OUTLINE);
        assert_eq!(*image.get_pixel(4, 3), OUTLINE);
        assert_eq!(*image.get_pixel(2, 3), OUTLINE);
        assert_eq!(*image.get_pixel(2, 1), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_skew_info_carried_to_packed_sprite() {
        let mut img = RgbaImage::new(12, 12);
        for i in 0..10 {
            img.put_pixel(1 + i, 10 - i, Rgba([0, 255, 0, 255]));
        }
        let (image, trim_info, skew) =
            crate::sprite::skew_sprite(&img, crate::skew::SearchMode::Unimodal).unwrap();
        let sprites = vec![SourceSprite {
            path: std::path::PathBuf::from("diag.png"),
            name: "diag".to_string(),
            image,
            trim_info,
            skew,
        }];

        let atlases = AtlasBuilder::new(64, 64).build(sprites).unwrap();
        let packed = &atlases[0].sprites[0];

        assert_eq!((packed.width, packed.height), (1, 10));
        assert_eq!(packed.skew.map(|s| s.skew_x), Some(-9));
        assert_eq!(atlases[0].skewed_count(), 1);
    }

    #[test]
    fn test_best_heuristic_packs_all_sprites() {
        let sprites = (0..4)
            .map(|i| solid_sprite(&format!("sprite_{}", i), 20, 20, [255, 0, 0, 255]))
            .collect();

        let atlases = AtlasBuilder::new(100, 100)
            .padding(1)
            .heuristic(PackingHeuristic::Best)
            .build(sprites)
            .unwrap();

        assert_eq!(atlases.len(), 1, "All sprites should fit in one atlas");
        assert_eq!(atlases[0].sprites.len(), 4);
    }

    #[test]
    fn test_best_heuristic_never_worse() {
        let create_sprites = || {
            [(30, 20), (25, 15), (40, 10), (15, 35), (20, 20)]
                .iter()
                .enumerate()
                .map(|(i, &(w, h))| solid_sprite(&format!("sprite_{}", i), w, h, [0, 0, 0, 255]))
                .collect::<Vec<_>>()
        };

        let best = AtlasBuilder::new(100, 100)
            .padding(0)
            .heuristic(PackingHeuristic::Best)
            .build(create_sprites())
            .unwrap();
        let best_packed = best[0].sprites.len();
        let best_area = best[0].width * best[0].height;

        for heuristic in ALL_HEURISTICS {
            let result = AtlasBuilder::new(100, 100)
                .padding(0)
                .heuristic(heuristic)
                .build(create_sprites())
                .unwrap();
            let packed = result[0].sprites.len();

            assert!(best_packed >= packed, "{:?}", heuristic);
            if packed == best_packed {
                assert!(best_area <= result[0].width * result[0].height, "{:?}", heuristic);
            }
        }
    }
}
