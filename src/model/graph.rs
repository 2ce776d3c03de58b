use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};
use rand::Rng;

use super::node::{Node, NodeId};

/// World coordinate around which new nodes are spawned.
pub const INITIAL_CENTER: Vec2 = vec2(5_000.0, 5_000.0);
const SPAWN_JITTER: f32 = 5.0;

pub const DEFAULT_TEAM_NAME: &str = "Untitled team";

/// Insertion-ordered arena owning every node. Links are kept symmetric.
#[derive(Clone, Debug)]
pub struct Graph {
    pub team_name: String,
    nodes: Vec<Node>,
    index_by_id: HashMap<NodeId, usize>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(DEFAULT_TEAM_NAME)
    }
}

impl Graph {
    pub fn new(team_name: impl Into<String>) -> Self {
        Self {
            team_name: team_name.into(),
            nodes: Vec::new(),
            index_by_id: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Mutable access to kinematic and descriptive fields. Links stay
    /// private to the graph so symmetry cannot be broken from outside.
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index_by_id.get(&id).copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index_by_id.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.index_of(id).map(|index| &mut self.nodes[index])
    }

    /// Adds `node` at a random spot next to [`INITIAL_CENTER`].
    pub fn add_node(&mut self, node: Node) -> NodeId {
        self.add_node_with_rng(node, &mut rand::thread_rng())
    }

    pub fn add_node_with_rng<R: Rng>(&mut self, node: Node, rng: &mut R) -> NodeId {
        let position = INITIAL_CENTER
            + vec2(
                rng.gen_range(-SPAWN_JITTER..=SPAWN_JITTER),
                rng.gen_range(-SPAWN_JITTER..=SPAWN_JITTER),
            );
        self.add_node_at(node, position)
    }

    /// Adds `node` at `position`. A node whose id is already present is
    /// dropped and the existing id is returned.
    pub fn add_node_at(&mut self, mut node: Node, position: Vec2) -> NodeId {
        let id = node.id;
        if self.index_by_id.contains_key(&id) {
            tracing::warn!(%id, "ignoring node with duplicate id");
            return id;
        }

        node.position = position;
        node.neighbors.clear();
        self.index_by_id.insert(id, self.nodes.len());
        self.nodes.push(node);
        tracing::debug!(%id, "added node");
        id
    }

    /// Links `a` and `b` in both directions. Returns `false` for self links,
    /// unknown ids, or links that already exist.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return false;
        }
        let (Some(index_a), Some(index_b)) = (self.index_of(a), self.index_of(b)) else {
            return false;
        };

        let mut changed = false;
        if !self.nodes[index_a].is_connected_to(b) {
            self.nodes[index_a].neighbors.push(b);
            changed = true;
        }
        if !self.nodes[index_b].is_connected_to(a) {
            self.nodes[index_b].neighbors.push(a);
            changed = true;
        }
        if changed {
            tracing::debug!(%a, %b, "connected nodes");
        }
        changed
    }

    pub fn disconnect(&mut self, a: NodeId, b: NodeId) -> bool {
        let (Some(index_a), Some(index_b)) = (self.index_of(a), self.index_of(b)) else {
            return false;
        };

        let before = self.nodes[index_a].neighbors.len() + self.nodes[index_b].neighbors.len();
        self.nodes[index_a].neighbors.retain(|&neighbor| neighbor != b);
        self.nodes[index_b].neighbors.retain(|&neighbor| neighbor != a);
        let after = self.nodes[index_a].neighbors.len() + self.nodes[index_b].neighbors.len();
        if after != before {
            tracing::debug!(%a, %b, "disconnected nodes");
        }
        after != before
    }

    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let index = self.index_by_id.remove(&id)?;
        let removed = self.nodes.remove(index);

        for node in &mut self.nodes {
            node.neighbors.retain(|&neighbor| neighbor != id);
        }
        for (position, node) in self.nodes.iter().enumerate().skip(index) {
            self.index_by_id.insert(node.id, position);
        }

        tracing::debug!(%id, "removed node");
        Some(removed)
    }

    pub fn neighbor_indices(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .get(index)
            .into_iter()
            .flat_map(|node| node.neighbors.iter())
            .filter_map(|id| self.index_of(*id))
    }

    /// Every link once, as `(lower index, higher index)`.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges = Vec::new();
        self.edges_into(&mut edges);
        edges
    }

    pub fn edges_into(&self, edges: &mut Vec<(usize, usize)>) {
        edges.clear();
        for index in 0..self.nodes.len() {
            for neighbor in self.neighbor_indices(index) {
                if index < neighbor {
                    edges.push((index, neighbor));
                }
            }
        }
    }

    pub fn edge_count(&self) -> usize {
        let endpoints = self
            .nodes
            .iter()
            .map(|node| node.neighbors.len())
            .sum::<usize>();
        endpoints / 2
    }

    /// Indices of `start` and every node reachable from it through links,
    /// in depth-first visiting order.
    pub fn reachable_from(&self, start: usize) -> Vec<usize> {
        if start >= self.nodes.len() {
            return Vec::new();
        }

        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![start];
        let mut reached = Vec::new();
        visited[start] = true;

        while let Some(current) = stack.pop() {
            reached.push(current);
            for next in self.neighbor_indices(current) {
                if !visited[next] {
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }

        reached
    }

    pub fn kinetic_energy(&self) -> f32 {
        self.nodes.iter().map(Node::kinetic_energy).sum()
    }
}
