use eframe::egui::{self, RichText, Ui};

use crate::model::NodeId;
use crate::util::{display_title, truncate_label};

use super::super::ViewModel;
use super::super::search::search_titles;

const CONNECT_RESULT_LIMIT: usize = 8;

enum DetailsAction {
    Select(NodeId),
    Connect(NodeId),
    Disconnect(NodeId),
    Delete,
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Node Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected else {
            ui.label("Select a node on the canvas or from the search results.");
            return;
        };

        let mut action = None;
        let mut text_changed = false;

        {
            let Some(node) = self.graph.node_mut(selected_id) else {
                ui.label("Selected node no longer exists.");
                return;
            };

            ui.label("Title");
            text_changed |= ui.text_edit_singleline(&mut node.title).changed();
            ui.label("Description");
            egui::ScrollArea::vertical()
                .id_salt("description_scroll")
                .max_height(180.0)
                .show(ui, |ui| {
                    text_changed |= ui
                        .add(
                            egui::TextEdit::multiline(&mut node.description)
                                .desired_rows(6)
                                .desired_width(f32::INFINITY),
                        )
                        .changed();
                });

            ui.add_space(4.0);
            ui.small(format!("id: {}", node.id));
            ui.small(format!("image: {}", node.image_name));
            ui.small(format!(
                "position: ({:.1}, {:.1})  speed: {:.2}",
                node.position.x,
                node.position.y,
                node.velocity.length()
            ));
        }

        ui.separator();
        ui.label(RichText::new("Linked nodes").strong());
        let neighbors = self
            .graph
            .node(selected_id)
            .map(|node| node.neighbors().to_vec())
            .unwrap_or_default();
        if neighbors.is_empty() {
            ui.label(RichText::new("No links yet.").weak());
        } else {
            egui::ScrollArea::vertical()
                .id_salt("neighbors_scroll")
                .max_height(220.0)
                .show(ui, |ui| {
                    for neighbor in &neighbors {
                        let Some(node) = self.graph.node(*neighbor) else {
                            continue;
                        };
                        ui.horizontal(|ui| {
                            let label = truncate_label(display_title(&node.title), 32).into_owned();
                            if ui.link(label).clicked() {
                                action = Some(DetailsAction::Select(*neighbor));
                            }
                            if ui.small_button("unlink").clicked() {
                                action = Some(DetailsAction::Disconnect(*neighbor));
                            }
                        });
                    }
                });
        }

        ui.separator();
        ui.label(RichText::new("Link to…").strong());
        ui.text_edit_singleline(&mut self.connect_search);
        let candidates = search_titles(
            &self.graph,
            &self.connect_search,
            CONNECT_RESULT_LIMIT,
            |id| id != selected_id && !neighbors.contains(&id),
        );
        for candidate in candidates {
            let Some(node) = self.graph.node(candidate) else {
                continue;
            };
            if ui
                .button(truncate_label(display_title(&node.title), 32).into_owned())
                .clicked()
            {
                action = Some(DetailsAction::Connect(candidate));
            }
        }

        ui.separator();
        if ui
            .button(RichText::new("Delete node").color(egui::Color32::from_rgb(235, 110, 96)))
            .clicked()
        {
            action = Some(DetailsAction::Delete);
        }

        if text_changed {
            self.mark_graph_changed();
        }

        match action {
            Some(DetailsAction::Select(id)) => self.focus_node(id),
            Some(DetailsAction::Connect(id)) => {
                self.graph.connect(selected_id, id);
                self.connect_search.clear();
                self.mark_graph_changed();
            }
            Some(DetailsAction::Disconnect(id)) => {
                self.graph.disconnect(selected_id, id);
                self.mark_graph_changed();
            }
            Some(DetailsAction::Delete) => {
                self.graph.remove_node(selected_id);
                self.mark_graph_changed();
            }
            None => {}
        }
    }
}
