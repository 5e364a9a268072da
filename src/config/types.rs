use serde::{Deserialize, Serialize};

use crate::cli::{CompressionLevel, PackingHeuristic};

/// PNG compression level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompressConfig {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression ("max")
    Max(String),
}

impl CompressConfig {
    pub fn to_level(&self) -> Option<CompressionLevel> {
        match self {
            CompressConfig::Level(n) if *n <= 6 => Some(CompressionLevel::Level(*n)),
            CompressConfig::Max(s) if s.eq_ignore_ascii_case("max") => Some(CompressionLevel::Max),
            _ => None,
        }
    }
}

/// skewpack configuration file structure.
///
/// All paths in the config are relative to the config file location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkewpackConfig {
    /// Config file version (currently 1)
    pub version: u32,
    /// Input file paths or glob patterns
    pub input: Vec<String>,
    /// Output directory for atlas files
    pub output_dir: String,
    /// Base name for output files (atlas_0.png, atlas.json, etc.)
    pub name: String,
    /// Maximum atlas width in pixels
    pub max_width: u32,
    /// Maximum atlas height in pixels
    pub max_height: u32,
    /// Padding between sprites in pixels
    pub padding: u32,
    /// Force power-of-two atlas dimensions
    pub pot: bool,
    /// Remove transparent borders
    pub trim: bool,
    /// Shear trimmed sprites into their minimal-area rectangle
    pub skew: bool,
    /// Try every shear candidate
    pub exhaustive: bool,
    /// Packing heuristic to use
    pub heuristic: PackingHeuristic,
    /// PNG compression configuration (optional)
    pub compress: Option<CompressConfig>,
    /// Outline every placed sprite in white
    pub debug_outline: bool,
}

impl Default for SkewpackConfig {
    fn default() -> Self {
        Self {
            version: 1,
            input: Vec::new(),
            output_dir: ".".to_string(),
            name: "atlas".to_string(),
            max_width: 4096,
            max_height: 4096,
            padding: 1,
            pot: false,
            trim: true,
            skew: true,
            exhaustive: false,
            heuristic: PackingHeuristic::BestShortSideFit,
            compress: None,
            debug_outline: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SkewpackConfig =
            serde_json::from_str(r#"{ "input": ["sprites/*.png"], "skew": false }"#).unwrap();

        assert_eq!(config.input, vec!["sprites/*.png"]);
        assert!(!config.skew);
        assert!(config.trim);
        assert_eq!(config.padding, 1);
        assert_eq!((config.max_width, config.max_height), (4096, 4096));
        assert_eq!(config.heuristic, PackingHeuristic::BestShortSideFit);
    }

    #[test]
    fn test_heuristic_names() {
        let config: SkewpackConfig =
            serde_json::from_str(r#"{ "heuristic": "best-area-fit" }"#).unwrap();
        assert_eq!(config.heuristic, PackingHeuristic::BestAreaFit);

        let bad = serde_json::from_str::<SkewpackConfig>(r#"{ "heuristic": "contact" }"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_compress_config() {
        let config: SkewpackConfig = serde_json::from_str(r#"{ "compress": "max" }"#).unwrap();
        assert_eq!(
            config.compress.and_then(|c| c.to_level()),
            Some(CompressionLevel::Max)
        );

        assert_eq!(
            CompressConfig::Level(3).to_level(),
            Some(CompressionLevel::Level(3))
        );
        assert_eq!(CompressConfig::Level(9).to_level(), None);
        assert_eq!(CompressConfig::Max("fast".to_string()).to_level(), None);
    }
}
