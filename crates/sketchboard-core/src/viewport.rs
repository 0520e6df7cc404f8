//! Viewport module for pan/zoom transforms.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Default minimum scale.
pub const MIN_SCALE: f64 = 0.1;
/// Default maximum scale.
pub const MAX_SCALE: f64 = 10.0;

/// Viewport maps between screen space and canvas space.
///
/// A canvas point `c` appears on screen at `c * scale + pan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current zoom factor.
    pub scale: f64,
    /// Screen-space translation.
    pub pan: Vec2,
    /// Minimum allowed scale.
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    /// Maximum allowed scale.
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
}

fn default_min_scale() -> f64 {
    MIN_SCALE
}

fn default_max_scale() -> f64 {
    MAX_SCALE
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan: Vec2::ZERO,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
        }
    }
}

impl Viewport {
    /// Create a viewport at 100% with no pan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a viewport with custom zoom limits.
    pub fn with_limits(min_scale: f64, max_scale: f64) -> Self {
        Self {
            min_scale,
            max_scale,
            ..Self::default()
        }
    }

    /// Restore a saved scale and pan, clamping the scale to this viewport's limits.
    pub fn restore(&mut self, scale: f64, pan: Vec2) {
        self.scale = self.clamp_scale(scale);
        self.pan = pan;
    }

    // Never panics, unlike `f64::clamp`, when the limits are inverted or NaN.
    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.max(self.min_scale).min(self.max_scale)
    }

    /// Canvas to screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.scale)
    }

    /// Screen to canvas transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.pan)
    }

    /// `(p - pan) / scale`.
    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        self.transform() * canvas_point
    }

    /// Convert a screen-space delta to canvas space.
    pub fn screen_delta_to_canvas(&self, delta: Vec2) -> Vec2 {
        delta / self.scale
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Apply one step of a pinch/pan gesture.
    ///
    /// The canvas point under `centroid` stays under it across the scale
    /// change, then `pan` is added.
    /// Non-finite input or a zoom factor that is not positive is ignored.
    pub fn apply_zoom_pan(&mut self, centroid: Point, pan: Vec2, zoom: f64) {
        if !zoom.is_finite() || zoom <= 0.0 || !pan.is_finite() || !centroid.is_finite() {
            log::debug!("Ignored zoom/pan step: zoom {} pan {:?}", zoom, pan);
            return;
        }
        let previous = self.scale;
        let new_scale = self.clamp_scale(previous * zoom);
        let scale_change = if previous == 0.0 { 1.0 } else { new_scale / previous };
        let centroid_to_content = centroid.to_vec2() - self.pan;

        self.scale = new_scale;
        self.pan = centroid.to_vec2() - centroid_to_content * scale_change + pan;
    }

    /// Canvas-space rectangle visible on a screen of `screen_size`.
    pub fn visible_rect(&self, screen_size: Size) -> Rect {
        let top_left = self.screen_to_canvas(Point::ZERO);
        let bottom_right = self.screen_to_canvas(Point::new(screen_size.width, screen_size.height));
        Rect::from_points(top_left, bottom_right)
    }

    /// Scale mapped linearly from `[min_scale, max_scale]` onto 1..=400 percent.
    pub fn zoom_percentage(&self) -> u32 {
        let range = self.max_scale - self.min_scale;
        if range <= 0.0 {
            return 100;
        }
        let percentage = (self.scale - self.min_scale) / range * 399.0 + 1.0;
        percentage.clamp(1.0, 400.0) as u32
    }

    /// Reset to 100% with no pan.
    pub fn reset(&mut self) {
        self.scale = self.clamp_scale(1.0);
        self.pan = Vec2::ZERO;
    }
}
