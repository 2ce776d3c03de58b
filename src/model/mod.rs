mod archive;
mod document;
mod graph;
mod node;
mod sample;
mod stats;

pub use archive::{open_graph, save_graph};
pub use graph::Graph;
pub use node::{Node, NodeId};
pub use sample::populate_demo;
pub use stats::GraphStats;
