//! Configuration loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable config files.
//! Block size and interpolated channel counts are compile-time choices and
//! are not configurable here.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rasterizer::{RasterOptions, Vertex};

/// Error type for config loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Rasterize block rows on the rayon thread pool
    pub parallel: bool,
    /// Default `env_logger` filter when RUST_LOG is not set
    pub log_level: String,
    pub scene: SceneConfig,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            log_level: "info".to_string(),
            scene: SceneConfig::default(),
        }
    }
}

impl RasterConfig {
    pub fn options(&self) -> RasterOptions {
        RasterOptions { parallel: self.parallel }
    }
}

/// What the demo host draws and how long it shows it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub width: usize,
    pub height: usize,
    pub v0: Vertex,
    pub v1: Vertex,
    pub v2: Vertex,
    /// Replace vertex colors with random ones at startup
    pub random_colors: bool,
    /// How long the window stays open
    pub display_ms: u64,
    /// Write the rendered frame as PNG
    pub snapshot: Option<PathBuf>,
    /// Compare against the brute-force rasterizer and log mismatches
    pub verify: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            v0: Vertex::new(500.0, 50.0).with_color(1.0, 0.0, 0.0),
            v1: Vertex::new(250.0, 300.0).with_color(0.0, 1.0, 0.0),
            v2: Vertex::new(10.0, 10.0).with_color(0.0, 0.0, 1.0),
            random_colors: true,
            display_ms: 6000,
            snapshot: None,
            verify: false,
        }
    }
}

/// Load a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RasterConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Load a config from a RON string
pub fn load_config_from_str(s: &str) -> Result<RasterConfig, ConfigError> {
    Ok(ron::from_str(s)?)
}

/// Save a config to a RON file
pub fn save_config<P: AsRef<Path>>(config: &RasterConfig, path: P) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = load_config_from_str("()").unwrap();
        assert_eq!(config, RasterConfig::default());
        assert_eq!(config.scene.display_ms, 6000);
    }

    #[test]
    fn test_partial_config() {
        let config = load_config_from_str(
            r#"(
                parallel: false,
                scene: (
                    width: 320,
                    height: 240,
                    v0: (x: 300.0, y: 20.0, r: 1.0),
                    random_colors: false,
                ),
            )"#,
        )
        .unwrap();

        assert!(!config.parallel);
        assert!(!config.options().parallel);
        assert_eq!(config.log_level, "info");
        assert_eq!((config.scene.width, config.scene.height), (320, 240));
        assert_eq!(config.scene.v0.x, 300.0);
        assert_eq!(config.scene.v0.r, 1.0);
        // fields left out keep their defaults
        assert_eq!(config.scene.v1, SceneConfig::default().v1);
        assert!(!config.scene.random_colors);
    }

    #[test]
    fn test_malformed_config() {
        let result = load_config_from_str("(parallel: maybe)");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_and_load() {
        let mut config = RasterConfig::default();
        config.parallel = false;
        config.scene.snapshot = Some(PathBuf::from("frame.png"));
        config.scene.v2 = Vertex::new(1.5, 2.5).with_color(0.1, 0.2, 0.3).with_avars(&[7.0]);

        let path = std::env::temp_dir().join(format!("edgeraster-config-{}.ron", std::process::id()));
        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/definitely/not/here.ron");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
