use std::fmt;

use eframe::egui::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_IMAGE_NAME: &str = "image_placeholder.png";

/// Stable node identifier, preserved across import and export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub title: String,
    pub description: String,
    pub image_name: String,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Net force accumulated during the current tick.
    pub force: Vec2,
    pub mass: f32,
    pub(super) neighbors: Vec<NodeId>,
}

impl Node {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_id(NodeId::new(), title, description)
    }

    pub fn with_id(id: NodeId, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            image_name: DEFAULT_IMAGE_NAME.to_owned(),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            mass: 1.0,
            neighbors: Vec::new(),
        }
    }

    /// Neighbor ids in the order the links were made.
    pub fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }

    pub fn is_connected_to(&self, other: NodeId) -> bool {
        self.neighbors.contains(&other)
    }

    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.length_sq()
    }
}
