use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use eframe::egui::vec2;
use serde::{Deserialize, Serialize};

use super::graph::{DEFAULT_TEAM_NAME, Graph};
use super::node::{DEFAULT_IMAGE_NAME, Node, NodeId};

/// On-disk shape of a graph: one record per node, links listed on both ends.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default = "default_team_name")]
    pub team_name: String,
    pub nodes: Vec<NodeRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeRecord {
    pub uuid: NodeId,
    #[serde(rename = "titel", alias = "title")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_image_name")]
    pub image_name: String,
    #[serde(default)]
    pub connected_nodes: Vec<NodeId>,
}

fn default_team_name() -> String {
    DEFAULT_TEAM_NAME.to_owned()
}

fn default_image_name() -> String {
    DEFAULT_IMAGE_NAME.to_owned()
}

impl GraphDocument {
    pub fn from_graph(graph: &Graph) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| NodeRecord {
                uuid: node.id,
                title: node.title.clone(),
                description: node.description.clone(),
                x: node.position.x,
                y: node.position.y,
                image_name: node.image_name.clone(),
                connected_nodes: node.neighbors().to_vec(),
            })
            .collect();

        Self {
            team_name: graph.team_name.clone(),
            nodes,
        }
    }

    /// Builds a fresh graph, rejecting duplicate ids, dangling links and
    /// non-finite coordinates.
    pub fn into_graph(self) -> Result<Graph> {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        for record in &self.nodes {
            if !seen.insert(record.uuid) {
                bail!("duplicate node id {}", record.uuid);
            }
            if !record.x.is_finite() || !record.y.is_finite() {
                bail!("node {} has non-finite coordinates", record.uuid);
            }
        }
        for record in &self.nodes {
            if let Some(missing) = record
                .connected_nodes
                .iter()
                .find(|target| !seen.contains(*target))
            {
                bail!("node {} links to unknown node {missing}", record.uuid);
            }
        }

        let mut graph = Graph::new(self.team_name);
        let mut links = Vec::new();
        for record in self.nodes {
            let id = record.uuid;
            let mut node = Node::with_id(id, record.title, record.description);
            node.image_name = record.image_name;
            links.extend(record.connected_nodes.into_iter().map(|target| (id, target)));
            graph.add_node_at(node, vec2(record.x, record.y));
        }
        for (source, target) in links {
            graph.connect(source, target);
        }

        Ok(graph)
    }
}

/// Decodes and validates a JSON document read from `origin`.
pub(super) fn parse_graph(raw: &str, origin: &Path) -> Result<Graph> {
    let document: GraphDocument = serde_json::from_str(raw)
        .with_context(|| format!("invalid graph document {}", origin.display()))?;
    document
        .into_graph()
        .with_context(|| format!("inconsistent graph document {}", origin.display()))
}

pub(super) fn encode_graph(graph: &Graph) -> Result<String> {
    let document = GraphDocument::from_graph(graph);
    serde_json::to_string_pretty(&document).context("failed to encode graph")
}

pub fn import_graph(path: &Path) -> Result<Graph> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph document {}", path.display()))?;
    let graph = parse_graph(&raw, path)?;

    tracing::info!(
        path = %path.display(),
        nodes = graph.len(),
        edges = graph.edge_count(),
        "imported graph"
    );
    Ok(graph)
}

pub fn export_graph(graph: &Graph, path: &Path) -> Result<()> {
    let json = encode_graph(graph)?;
    fs::write(path, json)
        .with_context(|| format!("failed to write graph document {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        nodes = graph.len(),
        edges = graph.edge_count(),
        "exported graph"
    );
    Ok(())
}
