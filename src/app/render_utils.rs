use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke};

use crate::interaction::ViewTransform;
use crate::layout::Region;

pub(super) const NODE_RADIUS: f32 = 5.0;
pub(super) const HIGHLIGHT_RADIUS: f32 = 8.0;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;
    let mix = |a: u8, b: u8| ((a as f32 * inverse) + (b as f32 * amount)) as u8;

    Color32::from_rgba_unmultiplied(
        mix(base.r(), overlay.r()),
        mix(base.g(), overlay.g()),
        mix(base.b(), overlay.b()),
        mix(base.a(), overlay.a()),
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, view: &ViewTransform) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(24, 26, 31));

    let step = (64.0 * view.zoom.clamp(0.5, 2.0)).max(24.0);
    let origin = rect.center() + view.pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(70, 76, 88, 60));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn draw_region(painter: &Painter, rect: Rect, view: &ViewTransform, region: &Region) {
    let min = view.world_to_screen(rect, region.bounds.min());
    let max = view.world_to_screen(rect, region.bounds.max());
    let screen = Rect::from_two_pos(min, max);
    if !screen.intersects(rect) {
        return;
    }

    let alpha = if region.is_leaf { 120 } else { 60 };
    let width = (1.4 - region.depth as f32 * 0.08).clamp(0.5, 1.4);
    painter.rect_stroke(
        screen,
        0.0,
        Stroke::new(width, Color32::from_rgba_unmultiplied(106, 198, 255, alpha)),
        eframe::egui::StrokeKind::Inside,
    );
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Cheap bounding-box test; segments crossing the canvas diagonally with
/// both ends outside still pass.
pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2) -> bool {
    let bounds = Rect::from_two_pos(start, end).expand(2.0);
    bounds.intersects(rect)
}
