use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};

use eframe::egui::{self, Context, Key};

use crate::interaction::ViewTransform;
use crate::layout::LayoutController;
use crate::model::{Graph, GraphStats, NodeId};

mod dialogs;
mod graph;
mod render_utils;
mod search;
mod ui;

use dialogs::{DialogOutcome, DialogRequest};

pub struct GraphApp {
    model: ViewModel,
    dialog_rx: Option<Receiver<DialogOutcome>>,
    image_dir: PathBuf,
}

struct ViewModel {
    graph: Graph,
    stats: GraphStats,
    layout: LayoutController,
    view: ViewTransform,
    selected: Option<NodeId>,
    dragging_subtree: bool,
    fit_requested: bool,
    show_regions: bool,
    search: String,
    connect_search: String,
    new_node: NewNodeForm,
    status: Option<Status>,
}

#[derive(Default)]
struct NewNodeForm {
    title: String,
    description: String,
    connect_to_selected: bool,
}

struct Status {
    text: String,
    is_error: bool,
}

impl GraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        graph: Graph,
        layout: LayoutController,
        image_dir: PathBuf,
    ) -> Self {
        Self {
            model: ViewModel::new(graph, layout),
            dialog_rx: None,
            image_dir,
        }
    }

    fn start_dialog(&mut self, request: DialogRequest) {
        if self.dialog_rx.is_some() {
            return;
        }

        self.dialog_rx = Some(match request {
            DialogRequest::Import => dialogs::spawn_import(self.image_dir.clone()),
            DialogRequest::Export => {
                dialogs::spawn_export(self.model.graph.clone(), self.image_dir.clone())
            }
        });
    }

    fn poll_dialog(&mut self) {
        let Some(rx) = self.dialog_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(outcome) => self.model.apply_dialog_outcome(outcome),
            Err(TryRecvError::Empty) => self.dialog_rx = Some(rx),
            Err(TryRecvError::Disconnected) => {
                self.model.set_error("File dialog worker stopped unexpectedly".to_owned());
            }
        }
    }
}

impl ViewModel {
    fn handle_shortcuts(&mut self, ctx: &Context) {
        // Keys typed into a text field belong to that field.
        let typing = ctx
            .memory(|memory| memory.focused())
            .is_some_and(|id| egui::text_edit::TextEditState::load(ctx, id).is_some());
        if typing {
            return;
        }

        let (toggle, close) =
            ctx.input(|input| (input.key_pressed(Key::Space), input.key_pressed(Key::Escape)));
        if toggle {
            self.layout.toggle();
        }
        if close {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

impl eframe::App for GraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_dialog();
        self.model.handle_shortcuts(ctx);

        let mut request = None;
        self.model.show(ctx, self.dialog_rx.is_some(), &mut request);
        if let Some(request) = request {
            self.start_dialog(request);
        }

        if self.model.layout.is_running() || self.dialog_rx.is_some() {
            ctx.request_repaint();
        }
    }
}
