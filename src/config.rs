use crate::defaults;
use crate::error::ConfigError;
use crate::layout::Direction;
use crate::model::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for the canvas, its layout and the host application.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub history_limit: usize,
    pub default_node_size: Size,
    pub default_group_size: Size,
    pub min_group_size: Size,
    /// Offset between successive palette insertions.
    pub cascade_step: f64,
    pub cascade_wrap: f64,
    pub cascade_origin: f64,
    pub paste_offset: f64,
    /// Horizontal routing wins when `|dx| > |dy| * routing_bias`.
    pub routing_bias: f64,
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
    pub storage_key: String,
    pub connect_edge_color: String,
    pub edge_stroke_width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub direction: Direction,
    pub node_sep: f64,
    pub rank_sep: f64,
    pub margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
    /// Fraction of the canvas left empty around a fitted graph.
    pub fit_padding: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: defaults::HISTORY_LIMIT,
            default_node_size: defaults::DEFAULT_NODE_SIZE,
            default_group_size: defaults::DEFAULT_GROUP_SIZE,
            min_group_size: defaults::MIN_GROUP_SIZE,
            cascade_step: 40.0,
            cascade_wrap: 200.0,
            cascade_origin: 100.0,
            paste_offset: 20.0,
            routing_bias: 0.8,
            layout: LayoutConfig::default(),
            viewport: ViewportConfig::default(),
            storage_key: defaults::STORAGE_KEY.to_string(),
            connect_edge_color: defaults::CONNECT_EDGE_COLOR.to_string(),
            edge_stroke_width: defaults::EDGE_STROKE_WIDTH,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::LeftToRight,
            node_sep: 120.0,
            rank_sep: 200.0,
            margin: 100.0,
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            min_zoom: 0.5,
            max_zoom: 2.0,
            zoom_step: 1.2,
            fit_padding: 0.1,
        }
    }
}

impl EditorConfig {
    /// Reject values the canvas cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "historyLimit",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.cascade_wrap <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "cascadeWrap",
                reason: "must be positive".to_string(),
            });
        }
        let vp = &self.viewport;
        if vp.min_zoom <= 0.0 || vp.min_zoom > vp.max_zoom {
            return Err(ConfigError::Invalid {
                field: "viewport.minZoom",
                reason: format!("expected 0 < minZoom <= maxZoom, got {} / {}", vp.min_zoom, vp.max_zoom),
            });
        }
        if vp.zoom_step <= 1.0 {
            return Err(ConfigError::Invalid {
                field: "viewport.zoomStep",
                reason: "must be greater than 1".to_string(),
            });
        }
        if crate::model::parse_hex_color(&self.connect_edge_color).is_none() {
            return Err(ConfigError::Invalid {
                field: "connectEdgeColor",
                reason: format!("'{}' is not a hex colour", self.connect_edge_color),
            });
        }
        Ok(())
    }
}

/// Load a config file, or the defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<EditorConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };

    let display = path.display().to_string();
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    let config: EditorConfig = serde_json::from_str(&contents)
        .map_err(|source| ConfigError::Parse { path: display, source })?;
    config.validate()?;
    log::debug!("loaded editor config from {}", path.display());
    Ok(config)
}
