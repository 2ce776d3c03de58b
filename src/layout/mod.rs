mod forces;
mod integrator;
mod quadtree;

use std::fmt;

use eframe::egui::Vec2;

use crate::config::LayoutConfig;
use crate::model::Graph;
use forces::{ForceParams, accumulate_springs, remove_net_drift, repulsion_for_node};
use integrator::{StepParams, integrate};
pub use quadtree::Region;
use quadtree::SpatialTree;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutState {
    Running,
    /// Kinematics are frozen; manual edits and the region overlay still work.
    #[default]
    Paused,
}

impl LayoutState {
    pub fn toggled(self) -> Self {
        match self {
            Self::Running => Self::Paused,
            Self::Paused => Self::Running,
        }
    }
}

impl fmt::Display for LayoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("running"),
            Self::Paused => f.write_str("paused"),
        }
    }
}

#[derive(Default)]
struct LayoutScratch {
    positions: Vec<Vec2>,
    masses: Vec<f32>,
    forces: Vec<Vec2>,
    margins: Vec<f32>,
    edges: Vec<(usize, usize)>,
    stack: Vec<usize>,
}

/// Drives one simulation tick per frame over the whole graph.
pub struct LayoutController {
    state: LayoutState,
    config: LayoutConfig,
    scratch: LayoutScratch,
}

impl LayoutController {
    pub fn new(config: LayoutConfig, state: LayoutState) -> Self {
        Self {
            state,
            config: config.validated(),
            scratch: LayoutScratch::default(),
        }
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LayoutState::Running
    }

    pub fn set_state(&mut self, state: LayoutState) {
        if self.state != state {
            tracing::debug!(from = %self.state, to = %state, "layout state changed");
            self.state = state;
        }
    }

    pub fn toggle(&mut self) -> LayoutState {
        self.set_state(self.state.toggled());
        self.state
    }

    pub fn config(&self) -> LayoutConfig {
        self.config
    }

    pub fn set_config(&mut self, config: LayoutConfig) {
        self.config = config.validated();
    }

    /// Runs one full tick unless paused. Returns whether any node moved.
    pub fn tick(&mut self, graph: &mut Graph) -> bool {
        match self.state {
            LayoutState::Paused => false,
            LayoutState::Running => self.step(graph),
        }
    }

    fn step(&mut self, graph: &mut Graph) -> bool {
        if graph.is_empty() {
            return false;
        }

        self.accumulate_forces(graph);
        integrate(
            graph.nodes_mut(),
            &self.scratch.margins,
            StepParams {
                time_step: self.config.time_step,
                damping: self.config.damping,
                max_speed: self.config.max_speed,
                rest_speed: self.config.rest_speed,
            },
        )
    }

    /// Rebuilds the spatial tree from current positions and stores each
    /// node's net repulsion plus spring force in `Node::force`, with the
    /// whole-graph drift left by approximated regions taken out.
    pub fn accumulate_forces(&mut self, graph: &mut Graph) {
        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.masses.clear();
        for node in graph.nodes() {
            scratch.positions.push(node.position);
            scratch.masses.push(node.mass);
        }
        scratch.forces.clear();
        scratch.forces.resize(graph.len(), Vec2::ZERO);
        scratch.margins.clear();
        graph.edges_into(&mut scratch.edges);

        let params = ForceParams {
            repulsion_strength: self.config.repulsion_strength,
            spring_strength: self.config.spring_strength,
            rest_length: self.config.rest_length,
            min_distance: self.config.min_distance,
            theta: self.config.theta,
        };

        let tree = SpatialTree::build(&scratch.positions, &scratch.masses, self.config.max_depth);
        for (index, force) in scratch.forces.iter_mut().enumerate() {
            let (push, margin) = repulsion_for_node(
                &tree,
                index,
                &scratch.positions,
                &scratch.masses,
                params,
                &mut scratch.stack,
            );
            *force += push;
            scratch.margins.push(margin);
        }
        accumulate_springs(&scratch.edges, &scratch.positions, params, &mut scratch.forces);
        remove_net_drift(&scratch.positions, &scratch.masses, &mut scratch.forces);

        for (node, force) in graph.nodes_mut().iter_mut().zip(&scratch.forces) {
            node.force = *force;
        }
    }

    /// Decomposition of the current positions, for the debug overlay.
    /// Built fresh on each call and available in either state.
    pub fn decomposition(&self, graph: &Graph) -> Vec<Region> {
        let positions = graph
            .nodes()
            .iter()
            .map(|node| node.position)
            .collect::<Vec<_>>();
        let masses = graph.nodes().iter().map(|node| node.mass).collect::<Vec<_>>();
        SpatialTree::build(&positions, &masses, self.config.max_depth)
            .regions()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::model::{Node, NodeId, populate_demo};

    fn running(config: LayoutConfig) -> LayoutController {
        LayoutController::new(config, LayoutState::Running)
    }

    fn distance(graph: &Graph, a: NodeId, b: NodeId) -> f32 {
        let (Some(a), Some(b)) = (graph.node(a), graph.node(b)) else {
            panic!("missing node");
        };
        (a.position - b.position).length()
    }

    #[test]
    fn starts_paused_and_toggles() {
        let mut controller = LayoutController::new(LayoutConfig::default(), LayoutState::default());
        assert_eq!(controller.state(), LayoutState::Paused);
        assert_eq!(controller.toggle(), LayoutState::Running);
        assert!(controller.is_running());
        assert_eq!(controller.toggle(), LayoutState::Paused);
    }

    #[test]
    fn paused_ticks_change_nothing() {
        let mut graph = Graph::default();
        let a = graph.add_node_at(Node::new("a", ""), vec2(0.0, 0.0));
        let b = graph.add_node_at(Node::new("b", ""), vec2(3.0, 1.0));
        graph.connect(a, b);
        for node in graph.nodes_mut() {
            node.velocity = vec2(4.0, -2.0);
        }
        let before = graph
            .nodes()
            .iter()
            .map(|node| (node.position, node.velocity))
            .collect::<Vec<_>>();

        let mut controller = LayoutController::new(LayoutConfig::default(), LayoutState::Paused);
        for _ in 0..25 {
            assert!(!controller.tick(&mut graph));
        }

        let after = graph
            .nodes()
            .iter()
            .map(|node| (node.position, node.velocity))
            .collect::<Vec<_>>();
        assert_eq!(before, after);
    }

    #[test]
    fn decomposition_is_available_while_paused() {
        let mut graph = Graph::default();
        graph.add_node_at(Node::new("a", ""), vec2(0.0, 0.0));
        graph.add_node_at(Node::new("b", ""), vec2(50.0, 50.0));

        let controller = LayoutController::new(LayoutConfig::default(), LayoutState::Paused);
        let regions = controller.decomposition(&graph);
        assert_eq!(regions.iter().filter(|region| region.is_leaf).count(), 2);
    }

    #[test]
    fn degenerate_graphs_tick_without_faults() {
        let mut controller = running(LayoutConfig::default());

        let mut empty = Graph::default();
        assert!(!controller.tick(&mut empty));

        let mut single = Graph::default();
        single.add_node_at(Node::new("only", ""), vec2(1.0, 1.0));
        controller.tick(&mut single);
        assert_eq!(single.nodes()[0].position, vec2(1.0, 1.0));

        let mut stacked = Graph::default();
        for index in 0..5 {
            stacked.add_node_at(Node::new(format!("n{index}"), ""), vec2(9.0, 9.0));
        }
        for _ in 0..10 {
            controller.tick(&mut stacked);
        }
        assert!(stacked.nodes().iter().all(|node| node.position.is_finite()));
        let spread = (stacked.nodes()[0].position - stacked.nodes()[1].position).length();
        assert!(spread > 0.0);
    }

    #[test]
    fn accumulated_forces_balance_across_the_graph() {
        let mut graph = Graph::default();
        let ids = (0..6)
            .map(|index| {
                let angle = index as f32;
                graph.add_node_at(
                    Node::new(format!("n{index}"), ""),
                    vec2(angle.cos() * 80.0 + angle * 5.0, angle.sin() * 60.0),
                )
            })
            .collect::<Vec<_>>();
        graph.connect(ids[0], ids[3]);
        graph.connect(ids[1], ids[2]);

        let mut controller = running(LayoutConfig {
            theta: 0.0,
            ..LayoutConfig::default()
        });
        controller.accumulate_forces(&mut graph);

        let net = graph
            .nodes()
            .iter()
            .fold(Vec2::ZERO, |sum, node| sum + node.force);
        assert!(net.length() < 1e-2, "net force {net:?}");
    }

    #[test]
    fn damped_spring_oscillation_dies_out() {
        let mut graph = Graph::default();
        let a = graph.add_node_at(Node::new("a", ""), vec2(0.0, 0.0));
        let b = graph.add_node_at(Node::new("b", ""), vec2(200.0, 0.0));
        graph.connect(a, b);

        let mut controller = running(LayoutConfig {
            repulsion_strength: 0.0,
            ..LayoutConfig::default()
        });

        let mut window_peaks = Vec::new();
        for _ in 0..20 {
            let mut peak = 0.0_f32;
            for _ in 0..25 {
                controller.tick(&mut graph);
                peak = peak.max(graph.kinetic_energy());
            }
            window_peaks.push(peak);
        }

        for pair in window_peaks.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-9, "energy rose: {pair:?}");
        }
        assert!(graph.kinetic_energy() < 1e-6);
        assert!((distance(&graph, a, b) - 60.0).abs() < 0.5);
    }

    #[test]
    fn linked_pair_settles_while_unlinked_node_drifts_away() {
        let config = LayoutConfig::default();
        let mut graph = Graph::default();
        let a = graph.add_node_at(Node::new("A", ""), vec2(0.0, 0.0));
        let b = graph.add_node_at(Node::new("B", ""), vec2(20.0, 10.0));
        let c = graph.add_node_at(Node::new("C", ""), vec2(-15.0, 25.0));
        graph.connect(a, b);

        let mut controller = running(config);
        let mut pair_distances = Vec::new();
        let mut drift = Vec::new();
        for _ in 0..12 {
            for _ in 0..250 {
                controller.tick(&mut graph);
            }
            pair_distances.push(distance(&graph, a, b));
            drift.push((distance(&graph, a, c), distance(&graph, b, c)));
        }

        // Spring pull balances pairwise repulsion at this separation.
        let k = config.spring_strength;
        let l = config.rest_length;
        let equilibrium =
            (k * l + ((k * l).powi(2) + 4.0 * k * config.repulsion_strength).sqrt()) / (2.0 * k);
        let settled = pair_distances[pair_distances.len() - 1];
        assert!((settled - equilibrium).abs() < equilibrium * 0.05, "{settled} vs {equilibrium}");
        assert!((settled - pair_distances[pair_distances.len() - 3]).abs() < 1.0);

        for pair in drift.windows(2) {
            assert!(pair[1].0 > pair[0].0, "C approached A: {pair:?}");
            assert!(pair[1].1 > pair[0].1, "C approached B: {pair:?}");
        }
    }

    #[test]
    fn default_layout_of_a_demo_graph_comes_to_rest() {
        let mut graph = Graph::default();
        populate_demo(&mut graph, 40, &mut StdRng::seed_from_u64(9));
        let mut controller = running(LayoutConfig::default());

        let mut window_peaks = Vec::new();
        let mut moved = true;
        for _ in 0..20 {
            let mut peak = 0.0_f32;
            for _ in 0..500 {
                moved = controller.tick(&mut graph);
                peak = peak.max(graph.kinetic_energy());
            }
            window_peaks.push(peak);
        }

        // The first thousand ticks unfold the spawn cluster, where a tangle
        // can briefly turn stored spring energy into motion.
        for pair in window_peaks[2..].windows(2) {
            assert!(pair[1] <= pair[0], "energy rose: {window_peaks:?}");
        }
        assert!(!moved, "still moving: {window_peaks:?}");
        assert!(graph.nodes().iter().all(|node| node.velocity == Vec2::ZERO));
        assert!(graph.nodes().iter().all(|node| node.position.is_finite()));
        assert!(!controller.tick(&mut graph));
    }
}
