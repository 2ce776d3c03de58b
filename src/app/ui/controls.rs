use eframe::egui::{self, RichText, Slider, Ui};

use crate::config::LayoutConfig;
use crate::model::Node;
use crate::util::{display_title, truncate_label};

use super::super::ViewModel;
use super::super::search::search_titles;

const SEARCH_RESULT_LIMIT: usize = 12;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        egui::ScrollArea::vertical()
            .id_salt("controls_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                self.draw_layout_controls(ui);
                ui.separator();
                self.draw_add_node(ui);
                ui.separator();
                self.draw_search(ui);
            });
    }

    fn draw_layout_controls(&mut self, ui: &mut Ui) {
        ui.heading("Layout");
        ui.add_space(4.0);

        let mut config = self.layout.config();
        let mut changed = false;

        changed |= ui
            .add(Slider::new(&mut config.theta, 0.0..=2.0).text("theta"))
            .on_hover_text("Barnes-Hut accuracy. 0 computes every pair exactly.")
            .changed();
        changed |= ui
            .add(Slider::new(&mut config.time_step, 0.05..=2.0).text("time step"))
            .changed();
        changed |= ui
            .add(Slider::new(&mut config.damping, 0.0..=0.99).text("damping"))
            .on_hover_text("Fraction of velocity kept each tick.")
            .changed();
        changed |= ui
            .add(Slider::new(&mut config.spring_strength, 0.0..=0.2).text("spring strength"))
            .changed();
        changed |= ui
            .add(Slider::new(&mut config.rest_length, 0.0..=300.0).text("rest length"))
            .changed();
        changed |= ui
            .add(
                Slider::new(&mut config.repulsion_strength, 0.0..=4000.0)
                    .logarithmic(true)
                    .text("repulsion"),
            )
            .changed();
        changed |= ui
            .add(Slider::new(&mut config.max_speed, 1.0..=200.0).text("max speed"))
            .changed();
        changed |= ui
            .add(Slider::new(&mut config.max_depth, 1..=64).text("tree depth limit"))
            .changed();
        changed |= ui
            .add(
                Slider::new(&mut config.min_distance, 0.001..=10.0)
                    .logarithmic(true)
                    .text("min distance"),
            )
            .changed();
        changed |= ui
            .add(
                Slider::new(&mut config.rest_speed, 0.0..=0.5)
                    .logarithmic(true)
                    .text("rest speed"),
            )
            .on_hover_text("Nodes slower than this stop moving.")
            .changed();

        if ui.button("Reset to defaults").clicked() {
            config = LayoutConfig::default();
            changed = true;
        }

        if changed {
            self.layout.set_config(config);
        }
    }

    fn draw_add_node(&mut self, ui: &mut Ui) {
        ui.heading("Add node");
        ui.add_space(4.0);

        ui.label("Title");
        ui.text_edit_singleline(&mut self.new_node.title);
        ui.label("Description");
        ui.add(
            egui::TextEdit::multiline(&mut self.new_node.description)
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        );

        let selected = self.selected;
        ui.add_enabled(
            selected.is_some(),
            egui::Checkbox::new(&mut self.new_node.connect_to_selected, "Link to selected node"),
        );

        let can_add = !self.new_node.title.trim().is_empty();
        if ui.add_enabled(can_add, egui::Button::new("Add")).clicked() {
            let node = Node::new(
                self.new_node.title.trim(),
                self.new_node.description.trim(),
            );
            let id = self.graph.add_node(node);
            if self.new_node.connect_to_selected
                && let Some(selected) = selected
            {
                self.graph.connect(id, selected);
            }

            self.new_node.title.clear();
            self.new_node.description.clear();
            self.mark_graph_changed();
            self.focus_node(id);
        }
    }

    fn draw_search(&mut self, ui: &mut Ui) {
        ui.heading("Search");
        ui.add_space(4.0);
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Fuzzy match on node titles. Click a result to select it.");

        let hits = search_titles(&self.graph, &self.search, SEARCH_RESULT_LIMIT, |_| true);
        if hits.is_empty() {
            if !self.search.trim().is_empty() {
                ui.label(RichText::new("No matching nodes.").weak());
            }
            return;
        }

        for id in hits {
            let Some(node) = self.graph.node(id) else {
                continue;
            };
            let label = truncate_label(display_title(&node.title), 40).into_owned();
            if ui
                .selectable_label(self.selected == Some(id), label)
                .clicked()
            {
                self.focus_node(id);
            }
        }
    }
}
