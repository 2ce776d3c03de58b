use rand::Rng;

use super::graph::Graph;
use super::node::Node;

/// Fills `graph` with `count` generated nodes linked as a random spanning
/// tree, plus roughly one extra cross link per ten nodes.
pub fn populate_demo<R: Rng>(graph: &mut Graph, count: usize, rng: &mut R) {
    let mut ids = Vec::with_capacity(count);
    for index in 0..count {
        let node = Node::new(
            format!("Node {}", index + 1),
            format!("Generated demo node number {}.", index + 1),
        );
        let id = graph.add_node_with_rng(node, rng);

        if !ids.is_empty() {
            let parent = ids[rng.gen_range(0..ids.len())];
            graph.connect(parent, id);
        }
        ids.push(id);
    }

    if count > 2 {
        for _ in 0..count / 10 {
            let a = ids[rng.gen_range(0..count)];
            let b = ids[rng.gen_range(0..count)];
            graph.connect(a, b);
        }
    }

    tracing::info!(nodes = graph.len(), edges = graph.edge_count(), "generated demo graph");
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn demo_graph_is_connected() {
        let mut graph = Graph::default();
        let mut rng = StdRng::seed_from_u64(42);
        populate_demo(&mut graph, 40, &mut rng);

        assert_eq!(graph.len(), 40);
        assert!(graph.edge_count() >= 39);
        assert_eq!(graph.reachable_from(0).len(), 40);
    }

    #[test]
    fn empty_demo_is_empty() {
        let mut graph = Graph::default();
        populate_demo(&mut graph, 0, &mut StdRng::seed_from_u64(1));
        assert!(graph.is_empty());
    }
}
