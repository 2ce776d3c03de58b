mod app;
mod config;
mod interaction;
mod layout;
mod model;
mod util;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::LayoutConfig;
use crate::layout::{LayoutController, LayoutState};
use crate::model::{Graph, GraphStats, open_graph, populate_demo};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph document (JSON) or archive (ZIP) to open at startup.
    #[arg(long)]
    graph: Option<PathBuf>,

    /// Directory holding node images. Archive imports extract into it and
    /// archive exports bundle from it.
    #[arg(long, value_name = "DIR", default_value = "images")]
    image_dir: PathBuf,

    /// JSON file with layout tunables; missing fields keep their defaults.
    #[arg(long)]
    layout_config: Option<PathBuf>,

    /// Generate this many nodes when no graph document is given.
    #[arg(long, value_name = "N")]
    demo: Option<usize>,

    /// Start with the layout running instead of paused.
    #[arg(long)]
    run: bool,

    /// Team name stored with exported documents.
    #[arg(long)]
    team_name: Option<String>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_layout_config(args: &Args) -> LayoutConfig {
    let Some(path) = &args.layout_config else {
        return LayoutConfig::default();
    };

    match LayoutConfig::load(path) {
        Ok(config) => config,
        Err(error) => {
            tracing::warn!("{error:#}; using default layout settings");
            LayoutConfig::default()
        }
    }
}

fn load_graph(args: &Args) -> Result<Graph> {
    let mut graph = match &args.graph {
        Some(path) => open_graph(path, &args.image_dir)?,
        None => {
            let mut graph = Graph::default();
            if let Some(count) = args.demo {
                populate_demo(&mut graph, count, &mut rand::thread_rng());
            }
            graph
        }
    };

    if let Some(team_name) = &args.team_name {
        graph.team_name = team_name.clone();
    }
    Ok(graph)
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    init_logging();

    let layout_config = load_layout_config(&args);
    let graph = match load_graph(&args) {
        Ok(graph) => graph,
        Err(error) => {
            tracing::error!("{error:#}; starting with an empty graph");
            Graph::default()
        }
    };
    GraphStats::collect(&graph).log();

    let state = if args.run {
        LayoutState::Running
    } else {
        LayoutState::Paused
    };
    let layout = LayoutController::new(layout_config, state);
    let image_dir = args.image_dir;

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "graph-canvas",
        options,
        Box::new(move |cc| Ok(Box::new(app::GraphApp::new(cc, graph, layout, image_dir)))),
    )
}
