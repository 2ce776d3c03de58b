use eframe::egui::{self, Rect, Ui};

use crate::interaction::{find_node_at, move_subtree};
use crate::model::NodeId;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn handle_canvas_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.view.zoom_around(rect, pointer, factor);
    }

    pub(in crate::app) fn handle_canvas_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.view.pan_by(response.drag_delta());
        }
    }

    /// Left press picks the node under the pointer (or clears the selection)
    /// and arms a subtree drag when something was hit.
    pub(in crate::app) fn handle_canvas_selection(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        let pressed = ui.input(|input| input.pointer.primary_pressed());
        if !pressed || !response.hovered() {
            return;
        }

        let hit = self.node_under_pointer(ui, rect);
        self.set_selected(hit);
        self.dragging_subtree = hit.is_some();
    }

    pub(in crate::app) fn handle_subtree_drag(&mut self, response: &egui::Response) {
        if !self.dragging_subtree {
            return;
        }

        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = self.view.screen_delta_to_world(response.drag_delta());
            if delta != egui::Vec2::ZERO {
                move_subtree(&mut self.graph, self.selected, delta);
            }
        }

        if response.drag_stopped() || !response.is_pointer_button_down_on() {
            self.dragging_subtree = false;
        }
    }

    pub(in crate::app) fn node_under_pointer(&self, ui: &Ui, rect: Rect) -> Option<NodeId> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        if !rect.contains(pointer) {
            return None;
        }

        let world = self.view.screen_to_world(rect, pointer);
        find_node_at(&self.graph, world, self.view.zoom)
    }
}
