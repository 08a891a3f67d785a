//! Pan/zoom transform between screen and flow coordinates.

use crate::config::ViewportConfig;
use crate::graph::Bounds;
use crate::model::Position;

/// `screen = flow * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { zoom: 1.0, pan_x: 0.0, pan_y: 0.0 }
    }
}

impl Viewport {
    pub fn screen_to_flow(&self, x: f64, y: f64) -> Position {
        let z = if self.zoom > 0.0 { self.zoom } else { 1.0 };
        Position::new((x - self.pan_x) / z, (y - self.pan_y) / z)
    }

    pub fn flow_to_screen(&self, p: Position) -> (f64, f64) {
        (p.x * self.zoom + self.pan_x, p.y * self.zoom + self.pan_y)
    }

    /// Zoom around the canvas centre, clamped to the configured range.
    pub fn zoom_by(&mut self, factor: f64, config: &ViewportConfig) {
        let target = (self.zoom * factor).clamp(config.min_zoom, config.max_zoom);
        if target == self.zoom {
            return;
        }
        let cx = config.width / 2.0;
        let cy = config.height / 2.0;
        let centre = self.screen_to_flow(cx, cy);
        self.zoom = target;
        self.pan_x = cx - centre.x * target;
        self.pan_y = cy - centre.y * target;
    }

    pub fn zoom_in(&mut self, config: &ViewportConfig) {
        self.zoom_by(config.zoom_step, config);
    }

    pub fn zoom_out(&mut self, config: &ViewportConfig) {
        self.zoom_by(1.0 / config.zoom_step, config);
    }

    /// Centre `bounds` in the canvas, leaving `fit_padding` of each dimension free.
    /// An empty graph (`None`) resets to the identity transform.
    pub fn fit(&mut self, bounds: Option<Bounds>, config: &ViewportConfig) {
        let Some(bounds) = bounds else {
            *self = Viewport::default();
            return;
        };
        let usable = 1.0 - 2.0 * config.fit_padding;
        let w = bounds.width.max(1.0);
        let h = bounds.height.max(1.0);
        let zoom = ((config.width * usable) / w)
            .min((config.height * usable) / h)
            .clamp(config.min_zoom, config.max_zoom);
        let (cx, cy) = bounds.center();
        self.zoom = zoom;
        self.pan_x = config.width / 2.0 - cx * zoom;
        self.pan_y = config.height / 2.0 - cy * zoom;
    }
}
