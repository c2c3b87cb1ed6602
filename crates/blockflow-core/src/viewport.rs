//! Viewport transform mapping pointer coordinates into canvas space.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Maps between screen (pixel) coordinates and logical canvas
/// coordinates.
///
/// The transform is derived from the logical view box and the rendered
/// pixel size, the same way an SVG `viewBox` relates to its element
/// box. Every gesture handler runs pointer positions through here
/// before doing geometry math.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    /// Logical region of the canvas currently shown.
    pub view_box: Rect,
    /// Rendered size in screen pixels; `None` until the host surface
    /// is mounted.
    pub pixel_size: Option<Size>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            view_box: Rect::new(0.0, 0.0, 1600.0, 1200.0),
            pixel_size: None,
        }
    }
}

impl Viewport {
    /// Create an unmounted viewport with the default view box.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the rendered pixel size once the host surface exists.
    pub fn mount(&mut self, width: f64, height: f64) {
        self.pixel_size = Some(Size::new(width.max(1.0), height.max(1.0)));
    }

    /// Whether the host surface has reported a size yet.
    pub fn is_mounted(&self) -> bool {
        self.pixel_size.is_some()
    }

    /// Uniform screen-pixels-per-canvas-unit scale.
    ///
    /// Uses the x axis; the view box is kept at the surface's aspect
    /// ratio by the renderer so the two axes agree.
    pub fn scale(&self) -> f64 {
        match self.pixel_size {
            Some(size) => size.width / self.view_box.width().max(1e-9),
            None => 1.0,
        }
    }

    /// Convert a screen-space point to canvas coordinates.
    ///
    /// Safe to call before the surface is mounted: returns the origin
    /// rather than failing, so listeners may run at any lifecycle
    /// point.
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        if !self.is_mounted() {
            return Point::ZERO;
        }
        let s = self.scale();
        Point::new(
            self.view_box.x0 + screen.x / s,
            self.view_box.y0 + screen.y / s,
        )
    }

    /// Convert a canvas-space point to screen coordinates.
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        let s = self.scale();
        Point::new(
            (canvas.x - self.view_box.x0) * s,
            (canvas.y - self.view_box.y0) * s,
        )
    }

    /// Convert a screen-space delta to a canvas-space delta.
    pub fn screen_delta_to_canvas(&self, delta: Vec2) -> Vec2 {
        if !self.is_mounted() {
            return Vec2::ZERO;
        }
        let s = self.scale();
        Vec2::new(delta.x / s, delta.y / s)
    }

    /// Pan the view box by a canvas-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.view_box = self.view_box + delta;
    }
}
