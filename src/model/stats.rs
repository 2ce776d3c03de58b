use super::graph::Graph;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Characters across every title and description.
    pub character_count: usize,
}

impl GraphStats {
    pub fn collect(graph: &Graph) -> Self {
        let character_count = graph
            .nodes()
            .iter()
            .map(|node| node.title.chars().count() + node.description.chars().count())
            .sum();

        Self {
            node_count: graph.len(),
            edge_count: graph.edge_count(),
            character_count,
        }
    }

    pub fn log(&self) {
        tracing::info!(
            nodes = self.node_count,
            edges = self.edge_count,
            characters = self.character_count,
            "graph statistics"
        );
    }
}
