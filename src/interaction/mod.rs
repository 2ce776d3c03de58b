mod transform;

use eframe::egui::Vec2;

use crate::model::{Graph, NodeId};
pub use transform::ViewTransform;

/// Hit radius in screen pixels; divided by zoom to get world units.
pub const HIT_RADIUS_PX: f32 = 8.0;

/// Node closest to `world` within `HIT_RADIUS_PX / zoom`. Equal distances go
/// to the node that comes first in the graph.
pub fn find_node_at(graph: &Graph, world: Vec2, zoom: f32) -> Option<NodeId> {
    if zoom.is_nan() || zoom <= 0.0 || !world.is_finite() {
        return None;
    }

    let radius = HIT_RADIUS_PX / zoom;
    graph
        .nodes()
        .iter()
        .filter_map(|node| {
            let distance = (node.position - world).length();
            (distance < radius).then_some((node.id, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Translates `selected` and everything linked to it, directly or not, by
/// `delta`. Returns the number of nodes moved.
pub fn move_subtree(graph: &mut Graph, selected: Option<NodeId>, delta: Vec2) -> usize {
    let Some(start) = selected.and_then(|id| graph.index_of(id)) else {
        return 0;
    };
    if !delta.is_finite() {
        return 0;
    }

    let reached = graph.reachable_from(start);
    let nodes = graph.nodes_mut();
    for &index in &reached {
        nodes[index].position += delta;
    }
    reached.len()
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::model::Node;

    fn position(graph: &Graph, id: NodeId) -> Vec2 {
        graph.node(id).expect("node exists").position
    }

    #[test]
    fn hit_radius_shrinks_with_zoom() {
        let mut graph = Graph::default();
        let id = graph.add_node_at(Node::new("target", ""), vec2(100.0, 100.0));

        assert_eq!(find_node_at(&graph, vec2(103.9, 100.0), 2.0), Some(id));
        assert_eq!(find_node_at(&graph, vec2(104.1, 100.0), 2.0), None);
        assert_eq!(find_node_at(&graph, vec2(100.0, 104.0), 2.0), None);
        assert_eq!(find_node_at(&graph, vec2(104.1, 100.0), 1.0), Some(id));
    }

    #[test]
    fn nearest_node_wins_when_hits_overlap() {
        let mut graph = Graph::default();
        let _far = graph.add_node_at(Node::new("far", ""), vec2(0.0, 0.0));
        let near = graph.add_node_at(Node::new("near", ""), vec2(5.0, 0.0));

        assert_eq!(find_node_at(&graph, vec2(4.0, 0.0), 1.0), Some(near));
    }

    #[test]
    fn equal_distances_go_to_the_earlier_node() {
        let mut graph = Graph::default();
        let first = graph.add_node_at(Node::new("first", ""), vec2(-2.0, 0.0));
        let _second = graph.add_node_at(Node::new("second", ""), vec2(2.0, 0.0));

        assert_eq!(find_node_at(&graph, vec2(0.0, 0.0), 1.0), Some(first));
    }

    #[test]
    fn empty_canvas_has_no_hit() {
        let graph = Graph::default();
        assert_eq!(find_node_at(&graph, vec2(0.0, 0.0), 1.0), None);
    }

    #[test]
    fn moving_a_chain_leaves_isolated_nodes_alone() {
        let mut graph = Graph::default();
        let a = graph.add_node_at(Node::new("A", ""), vec2(0.0, 0.0));
        let b = graph.add_node_at(Node::new("B", ""), vec2(30.0, 0.0));
        let c = graph.add_node_at(Node::new("C", ""), vec2(60.0, 20.0));
        let d = graph.add_node_at(Node::new("D", ""), vec2(-40.0, -40.0));
        graph.connect(a, b);
        graph.connect(b, c);

        let moved = move_subtree(&mut graph, Some(a), vec2(10.0, 5.0));

        assert_eq!(moved, 3);
        assert_eq!(position(&graph, a), vec2(10.0, 5.0));
        assert_eq!(position(&graph, b), vec2(40.0, 5.0));
        assert_eq!(position(&graph, c), vec2(70.0, 25.0));
        assert_eq!(position(&graph, d), vec2(-40.0, -40.0));
    }

    #[test]
    fn cycles_move_each_node_once() {
        let mut graph = Graph::default();
        let ids = (0..4)
            .map(|index| {
                graph.add_node_at(Node::new(format!("n{index}"), ""), vec2(index as f32, 0.0))
            })
            .collect::<Vec<_>>();
        for pair in ids.windows(2) {
            graph.connect(pair[0], pair[1]);
        }
        graph.connect(ids[3], ids[0]);

        assert_eq!(move_subtree(&mut graph, Some(ids[2]), vec2(1.0, 1.0)), 4);
        for (index, id) in ids.iter().enumerate() {
            assert_eq!(position(&graph, *id), vec2(index as f32 + 1.0, 1.0));
        }
    }

    #[test]
    fn missing_selection_moves_nothing() {
        let mut graph = Graph::default();
        let lone = graph.add_node_at(Node::new("lone", ""), vec2(3.0, 4.0));

        assert_eq!(move_subtree(&mut graph, None, vec2(10.0, 5.0)), 0);
        assert_eq!(move_subtree(&mut graph, Some(NodeId::new()), vec2(10.0, 5.0)), 0);
        assert_eq!(move_subtree(&mut graph, Some(lone), vec2(10.0, 5.0)), 1);
        assert_eq!(position(&graph, lone), vec2(13.0, 9.0));
    }
}
