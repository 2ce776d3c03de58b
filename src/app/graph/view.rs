use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Stroke, Ui, vec2};

use crate::util::{display_title, truncate_label};

use super::super::ViewModel;
use super::super::render_utils::{
    HIGHLIGHT_RADIUS, NODE_RADIUS, blend_color, circle_visible, draw_background, draw_region,
    edge_visible,
};

const LABEL_ZOOM: f32 = 1.2;

impl ViewModel {
    /// Subtree of the current selection as a per-index mask.
    fn subtree_mask(&self) -> Vec<bool> {
        let mut mask = vec![false; self.graph.len()];
        if let Some(start) = self.selected.and_then(|id| self.graph.index_of(id)) {
            for index in self.graph.reachable_from(start) {
                mask[index] = true;
            }
        }
        mask
    }

    pub(in crate::app) fn draw_canvas(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if self.fit_requested {
            self.fit_requested = false;
            self.fit_view(rect.size());
        }

        draw_background(&painter, rect, &self.view);

        self.handle_canvas_zoom(ui, rect, &response);
        self.handle_canvas_pan(&response);
        self.handle_canvas_selection(ui, rect, &response);
        self.handle_subtree_drag(&response);

        self.layout.tick(&mut self.graph);

        if self.show_regions {
            for region in self.layout.decomposition(&self.graph) {
                draw_region(&painter, rect, &self.view, &region);
            }
        }

        let view = self.view;
        let screen_positions = self
            .graph
            .nodes()
            .iter()
            .map(|node| view.world_to_screen(rect, node.position))
            .collect::<Vec<Pos2>>();
        let subtree = self.subtree_mask();
        let selection_active = self.selected.is_some();

        let edge_width = (1.2 * view.zoom.sqrt()).clamp(0.6, 3.0);
        for (from, to) in self.graph.edges() {
            let start = screen_positions[from];
            let end = screen_positions[to];
            if !edge_visible(rect, start, end) {
                continue;
            }

            let color = if subtree[from] && subtree[to] {
                Color32::from_rgb(241, 146, 94)
            } else if selection_active {
                Color32::from_rgba_unmultiplied(90, 96, 108, 110)
            } else {
                Color32::from_rgba_unmultiplied(150, 156, 168, 170)
            };
            painter.line_segment([start, end], Stroke::new(edge_width, color));
        }

        let hovered = self.node_under_pointer(ui, rect);
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let base_color = Color32::from_rgb(88, 166, 232);
        let selected_color = Color32::from_rgb(245, 206, 93);
        for (index, node) in self.graph.nodes().iter().enumerate() {
            let is_selected = self.selected == Some(node.id);
            let is_hovered = hovered == Some(node.id);
            let highlighted = subtree[index] || is_hovered;
            let radius = if highlighted { HIGHLIGHT_RADIUS } else { NODE_RADIUS };

            let position = screen_positions[index];
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let color = if is_selected {
                selected_color
            } else if subtree[index] {
                blend_color(base_color, Color32::from_rgb(246, 137, 92), 0.65)
            } else if is_hovered {
                blend_color(base_color, Color32::WHITE, 0.35)
            } else {
                base_color
            };
            painter.circle_filled(position, radius, color);
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
            );

            if highlighted || view.zoom > LABEL_ZOOM {
                painter.text(
                    position + vec2(radius + 4.0, 0.0),
                    Align2::LEFT_CENTER,
                    truncate_label(display_title(&node.title), 32),
                    FontId::proportional(12.0),
                    Color32::from_gray(236),
                );
            }
        }

        if let Some(node) = hovered.and_then(|id| self.graph.node(id)) {
            let summary = format!(
                "{}  |  links {}  |  ({:.0}, {:.0})",
                display_title(&node.title),
                node.neighbors().len(),
                node.position.x,
                node.position.y
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                summary,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if self.graph.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Empty canvas. Add a node or import a graph.",
                FontId::proportional(15.0),
                Color32::from_gray(150),
            );
        }

        if response.dragged() {
            ui.ctx().request_repaint();
        }
    }
}
