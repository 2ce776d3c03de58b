use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::Result;

use crate::model::{Graph, open_graph, save_graph};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum DialogRequest {
    Import,
    Export,
}

pub(super) enum DialogOutcome {
    Imported { path: PathBuf, result: Result<Graph> },
    Exported { path: PathBuf, result: Result<()> },
    Cancelled,
}

fn graph_file_dialog() -> rfd::FileDialog {
    rfd::FileDialog::new()
        .add_filter("Graph archive", &["zip"])
        .add_filter("Graph document", &["json"])
}

/// Archive images are extracted into `image_dir`.
pub(super) fn spawn_import(image_dir: PathBuf) -> Receiver<DialogOutcome> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let outcome = match graph_file_dialog().pick_file() {
            Some(path) => {
                let result = open_graph(&path, &image_dir);
                DialogOutcome::Imported { path, result }
            }
            None => DialogOutcome::Cancelled,
        };
        let _ = tx.send(outcome);
    });

    rx
}

/// Exports a snapshot so the canvas keeps running while the dialog is open.
/// Archives bundle the referenced images found in `image_dir`.
pub(super) fn spawn_export(snapshot: Graph, image_dir: PathBuf) -> Receiver<DialogOutcome> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let outcome = match graph_file_dialog().set_file_name("graph.zip").save_file() {
            Some(path) => {
                let result = save_graph(&snapshot, &path, &image_dir);
                DialogOutcome::Exported { path, result }
            }
            None => DialogOutcome::Cancelled,
        };
        let _ = tx.send(outcome);
    });

    rx
}
