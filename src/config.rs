//! Engine configuration and the render settings derived from it.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Engine-wide settings, read from a JSON file.
///
/// Every key is optional; missing keys fall back to [`Default`] and unknown
/// keys are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory searched for backend modules.
    pub module_path: PathBuf,
    /// Logical name of the graphics module.
    pub gfx_module: String,
    /// Logical name of the event module.
    pub event_module: String,
    /// Screen width in pixels.
    pub screen_width: u16,
    /// Screen height in pixels.
    pub screen_height: u16,
    /// Bits per pixel.
    pub screen_depth: u8,
    /// Tile width in pixels.
    pub tile_width: u16,
    /// Tile height in pixels.
    pub tile_height: u16,
    /// Image holding every tile of the map.
    pub tileset: String,
    /// Tiles per tileset row; `None` means one horizontal strip.
    pub tileset_columns: Option<u16>,
    /// Fixed delay after presenting each frame.
    pub frame_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            module_path: PathBuf::from("modules/"),
            gfx_module: "gfx-dummy".to_owned(),
            event_module: "event-dummy".to_owned(),
            screen_width: 640,
            screen_height: 480,
            screen_depth: 32,
            tile_width: 32,
            tile_height: 32,
            tileset: "tiles.png".to_owned(),
            tileset_columns: None,
            frame_delay_ms: 30,
        }
    }
}

impl EngineConfig {
    /// Read a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let txt = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&txt).map_err(|source| ConfigError::Json {
            path: Some(path.to_path_buf()),
            source,
        })
    }

    /// Parse configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Json { path: None, source })
    }

    /// The subset the map view consumes.
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings::from(self)
    }
}

/// The part of the configuration the map view needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    /// Viewport width in pixels.
    pub screen_width: i32,
    /// Viewport height in pixels.
    pub screen_height: i32,
    /// Tile width in pixels, at least 1.
    pub tile_width: i32,
    /// Tile height in pixels, at least 1.
    pub tile_height: i32,
    /// Tileset image filename.
    pub tileset: String,
    /// Tiles per tileset row, if laid out as a grid.
    pub tileset_columns: Option<u16>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for RenderSettings {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            screen_width: cfg.screen_width as i32,
            screen_height: cfg.screen_height as i32,
            tile_width: cfg.tile_width.max(1) as i32,
            tile_height: cfg.tile_height.max(1) as i32,
            tileset: cfg.tileset.clone(),
            tileset_columns: cfg.tileset_columns.filter(|&c| c > 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let cfg = EngineConfig::from_json_str("{}").expect("parse");
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.tile_width, 32);
        assert_eq!(cfg.module_path, PathBuf::from("modules/"));
    }

    #[test]
    fn overrides_and_ignores_unknown_keys() {
        let cfg = EngineConfig::from_json_str(
            r#"{ "screen_width": 320, "tileset": "forest.png", "tileset_columns": 8, "colour": "blue" }"#,
        )
        .expect("parse");
        assert_eq!(cfg.screen_width, 320);
        assert_eq!(cfg.screen_height, 480);

        let rs = cfg.render_settings();
        assert_eq!(rs.tileset, "forest.png");
        assert_eq!(rs.tileset_columns, Some(8));
    }

    #[test]
    fn zero_columns_means_strip() {
        let cfg = EngineConfig::from_json_str(r#"{ "tileset_columns": 0 }"#).expect("parse");
        assert_eq!(cfg.render_settings().tileset_columns, None);
    }

    #[test]
    fn malformed_json_is_a_typed_error() {
        let err = EngineConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Json { path: None, .. }));
    }
}
