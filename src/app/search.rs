use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::model::{Graph, NodeId};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// Nodes whose title matches `query`, best score first. Ties keep graph
/// order. Nodes rejected by `keep` are skipped.
pub(super) fn search_titles(
    graph: &Graph,
    query: &str,
    limit: usize,
    keep: impl Fn(NodeId) -> bool,
) -> Vec<NodeId> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = graph
        .nodes()
        .iter()
        .filter(|node| keep(node.id))
        .filter_map(|node| {
            fuzzy_match_score(&matcher, &node.title, query).map(|score| (node.id, score))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(limit);
    scored.into_iter().map(|(id, _)| id).collect()
}
