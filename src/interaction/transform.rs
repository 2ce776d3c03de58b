use eframe::egui::{Pos2, Rect, Vec2};

pub const MIN_ZOOM: f32 = 0.05;
pub const MAX_ZOOM: f32 = 6.0;

/// Maps world coordinates onto the canvas: `screen = center + pan + world * zoom`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl ViewTransform {
    pub fn world_to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        rect.center() + self.pan + world * self.zoom
    }

    pub fn screen_to_world(&self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.center() - self.pan) / self.zoom
    }

    /// Converts a pointer movement on screen into the matching world offset.
    pub fn screen_delta_to_world(&self, delta: Vec2) -> Vec2 {
        delta / self.zoom
    }

    /// Scales the view by `factor` while keeping the world point under
    /// `anchor` fixed on screen.
    pub fn zoom_around(&mut self, rect: Rect, anchor: Pos2, factor: f32) {
        let world_before = self.screen_to_world(rect, anchor);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = anchor - rect.center() - world_before * self.zoom;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Centers `world` in the canvas without changing zoom.
    pub fn focus_on(&mut self, world: Vec2) {
        self.pan = -world * self.zoom;
    }

    /// Fits the bounding box of `points` into a canvas of size `size`.
    pub fn fit(&mut self, points: impl IntoIterator<Item = Vec2>, size: Vec2) {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for point in points {
            min = min.min(point);
            max = max.max(point);
        }
        if !min.is_finite() || !max.is_finite() {
            return;
        }

        let extent = (max - min).max(Vec2::splat(1.0));
        let margin = 0.85;
        let zoom = ((size.x / extent.x).min(size.y / extent.y) * margin).clamp(MIN_ZOOM, MAX_ZOOM);
        self.zoom = if zoom.is_finite() { zoom } else { 1.0 };
        self.focus_on((min + max) * 0.5);
    }
}
