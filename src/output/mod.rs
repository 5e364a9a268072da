mod format;
mod json;

pub use format::save_atlas_image;
pub use json::write_json;

/// PNG file name of one atlas page: `name.png` when there is a single page,
/// `name_N.png` otherwise
pub fn atlas_png_filename(base_name: &str, index: usize, total: usize) -> String {
    if total == 1 {
        format!("{}.png", base_name)
    } else {
        format!("{}_{}.png", base_name, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atlas_png_filename() {
        assert_eq!(atlas_png_filename("atlas", 0, 1), "atlas.png");
        assert_eq!(atlas_png_filename("atlas", 0, 3), "atlas_0.png");
        assert_eq!(atlas_png_filename("ui", 2, 3), "ui_2.png");
    }
}
