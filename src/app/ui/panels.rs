use eframe::egui::{self, Align, Color32, Context, Layout, RichText, Vec2};

use crate::interaction::ViewTransform;
use crate::layout::{LayoutController, LayoutState};
use crate::model::{Graph, GraphStats, NodeId};

use super::super::dialogs::{DialogOutcome, DialogRequest};
use super::super::{NewNodeForm, Status, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(graph: Graph, layout: LayoutController) -> Self {
        Self {
            stats: GraphStats::collect(&graph),
            graph,
            layout,
            view: ViewTransform::default(),
            selected: None,
            dragging_subtree: false,
            fit_requested: true,
            show_regions: false,
            search: String::new(),
            connect_search: String::new(),
            new_node: NewNodeForm::default(),
            status: None,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        dialog_open: bool,
        request: &mut Option<DialogRequest>,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("graph-canvas");
                    ui.separator();
                    ui.label(format!("team: {}", self.graph.team_name));

                    if ui
                        .add_enabled(!dialog_open, egui::Button::new("Import…"))
                        .clicked()
                    {
                        *request = Some(DialogRequest::Import);
                    }
                    if ui
                        .add_enabled(!dialog_open, egui::Button::new("Export…"))
                        .clicked()
                    {
                        *request = Some(DialogRequest::Export);
                    }

                    let toggle_label = match self.layout.state() {
                        LayoutState::Running => "Pause",
                        LayoutState::Paused => "Resume",
                    };
                    if ui
                        .button(toggle_label)
                        .on_hover_text("Space toggles the layout as well.")
                        .clicked()
                    {
                        self.layout.toggle();
                    }
                    ui.checkbox(&mut self.show_regions, "Show Barnes-Hut regions");
                    if ui.button("Fit view").clicked() {
                        self.fit_requested = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "layout: {}  energy: {:.3}",
                            self.layout.state(),
                            self.graph.kinetic_energy()
                        ));
                        ui.label(format!(
                            "nodes: {}  edges: {}  characters: {}",
                            self.stats.node_count, self.stats.edge_count, self.stats.character_count
                        ));
                        if dialog_open {
                            ui.spinner();
                        }
                    });
                });

                if let Some(status) = &self.status {
                    let text = RichText::new(status.text.as_str());
                    if status.is_error {
                        ui.label(text.color(Color32::from_rgb(235, 110, 96)));
                    } else {
                        ui.label(text.weak());
                    }
                }
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_canvas(ui));
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<NodeId>) {
        if self.selected == selected {
            return;
        }

        self.selected = selected;
        self.connect_search.clear();
    }

    /// Selects `id` and centers the view on it.
    pub(in crate::app) fn focus_node(&mut self, id: NodeId) {
        if let Some(node) = self.graph.node(id) {
            self.view.focus_on(node.position);
            self.set_selected(Some(id));
        }
    }

    pub(in crate::app) fn fit_view(&mut self, canvas: Vec2) {
        let positions = self.graph.nodes().iter().map(|node| node.position);
        self.view.fit(positions, canvas);
    }

    /// Refreshes cached statistics after nodes, links or texts changed.
    pub(in crate::app) fn mark_graph_changed(&mut self) {
        self.stats = GraphStats::collect(&self.graph);
        if self.selected.is_some_and(|id| !self.graph.contains(id)) {
            self.set_selected(None);
        }
    }

    pub(in crate::app) fn set_info(&mut self, text: String) {
        self.status = Some(Status {
            text,
            is_error: false,
        });
    }

    pub(in crate::app) fn set_error(&mut self, text: String) {
        tracing::warn!("{text}");
        self.status = Some(Status {
            text,
            is_error: true,
        });
    }

    pub(in crate::app) fn apply_dialog_outcome(&mut self, outcome: DialogOutcome) {
        match outcome {
            DialogOutcome::Imported { path, result } => match result {
                Ok(graph) => {
                    self.graph = graph;
                    self.set_selected(None);
                    self.dragging_subtree = false;
                    self.fit_requested = true;
                    self.mark_graph_changed();
                    self.stats.log();
                    self.set_info(format!("Imported {}", path.display()));
                }
                Err(error) => self.set_error(format!("Import failed: {error:#}")),
            },
            DialogOutcome::Exported { path, result } => match result {
                Ok(()) => self.set_info(format!("Exported {}", path.display())),
                Err(error) => self.set_error(format!("Export failed: {error:#}")),
            },
            DialogOutcome::Cancelled => {}
        }
    }
}
