//! Viewport: zoom and pan applied when presenting the scene.
//!
//! Screen and canvas coordinates are related by
//! `screen = canvas * zoom + pan`. The viewport is presentation state only
//! and never enters history.

use serde::{Deserialize, Serialize};

use crate::{EditorConfig, Point};

/// Zoom factor and pan offset of the visible area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Visible width in screen pixels.
    pub width: f32,
    /// Visible height in screen pixels.
    pub height: f32,
    zoom: f32,
    pan_x: f32,
    pan_y: f32,
    min_zoom: f32,
    max_zoom: f32,
}

impl Viewport {
    /// Lower zoom bound used by [`Viewport::new`].
    pub const MIN_ZOOM: f32 = 0.1;
    /// Upper zoom bound used by [`Viewport::new`].
    pub const MAX_ZOOM: f32 = 5.0;

    /// Create a viewport at 100% with no pan.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            min_zoom: Self::MIN_ZOOM,
            max_zoom: Self::MAX_ZOOM,
        }
    }

    /// Create a viewport from editor configuration.
    #[must_use]
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            ..Self::new(config.viewport_width, config.viewport_height)
        }
    }

    /// Current zoom factor (1.0 = 100%).
    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Current pan offset in screen pixels.
    #[must_use]
    pub fn pan_offset(&self) -> Point {
        Point::new(self.pan_x, self.pan_y)
    }

    /// Allowed zoom range.
    #[must_use]
    pub fn zoom_bounds(&self) -> (f32, f32) {
        (self.min_zoom, self.max_zoom)
    }

    /// Center of the visible area in screen pixels.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether the content overflows and should be scrollable.
    #[must_use]
    pub fn is_scrollable(&self) -> bool {
        self.zoom > 1.0
    }

    /// Convert a screen point to canvas coordinates.
    #[must_use]
    pub fn screen_to_canvas(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.pan_x) / self.zoom,
            (point.y - self.pan_y) / self.zoom,
        )
    }

    /// Convert a canvas point to screen coordinates.
    #[must_use]
    pub fn canvas_to_screen(&self, point: Point) -> Point {
        Point::new(
            point.x * self.zoom + self.pan_x,
            point.y * self.zoom + self.pan_y,
        )
    }

    /// Multiply the zoom by `factor`, keeping `anchor` (screen pixels) fixed.
    ///
    /// With no anchor, the viewport center is used. Returns the new zoom.
    pub fn zoom_by(&mut self, factor: f32, anchor: Option<Point>) -> f32 {
        if !factor.is_finite() || factor <= 0.0 {
            tracing::warn!(factor, "Ignoring invalid zoom factor");
            return self.zoom;
        }
        let anchor = anchor.unwrap_or_else(|| self.center());
        self.zoom_to(self.zoom * factor, anchor)
    }

    /// Set the zoom directly, anchored at the viewport center.
    pub fn set_zoom(&mut self, value: f32) -> f32 {
        if !value.is_finite() {
            tracing::warn!(value, "Ignoring invalid zoom value");
            return self.zoom;
        }
        let center = self.center();
        self.zoom_to(value, center)
    }

    fn zoom_to(&mut self, target: f32, anchor: Point) -> f32 {
        let old = self.zoom;
        let new = target.clamp(self.min_zoom, self.max_zoom);
        // Offset of the anchor from the pan origin scales with the zoom ratio.
        let ratio = new / old;
        self.pan_x = anchor.x - (anchor.x - self.pan_x) * ratio;
        self.pan_y = anchor.y - (anchor.y - self.pan_y) * ratio;
        self.zoom = new;
        new
    }

    /// Shift the pan offset by a screen-space delta.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        if !dx.is_finite() || !dy.is_finite() {
            tracing::warn!(dx, dy, "Ignoring invalid pan delta");
            return;
        }
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Back to 100% with no pan.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }

    /// Change the visible size.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}
