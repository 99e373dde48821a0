use std::collections::{HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::graph::DependencyGraph;

/// Vertices nothing else depends on, in vertex insertion order.
pub fn roots(graph: &DependencyGraph) -> Vec<&str> {
    let mut incoming: HashSet<&str> = HashSet::new();
    for vertex in graph.vertices() {
        for dep in graph.adjacent_vertices_of(vertex).unwrap_or_default() {
            incoming.insert(dep.as_str());
        }
    }
    graph
        .vertices()
        .iter()
        .map(String::as_str)
        .filter(|vertex| !incoming.contains(vertex))
        .collect()
}

/// Packages that list `package` as a direct dependency.
pub fn dependents_of<'g>(graph: &'g DependencyGraph, package: &str) -> Vec<&'g str> {
    graph
        .vertices()
        .iter()
        .filter(|vertex| {
            graph
                .adjacent_vertices_of(vertex)
                .unwrap_or_default()
                .iter()
                .any(|dep| dep == package)
        })
        .map(String::as_str)
        .collect()
}

/// Every group of packages that depend on each other in a loop.
///
/// Each group is one strongly connected component with more than one
/// member, or a single package depending on itself. Groups are sorted
/// internally and against each other.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Vec<String>> {
    let digraph = to_petgraph(graph);
    let mut cycles: Vec<Vec<String>> = tarjan_scc(&digraph)
        .into_iter()
        .filter(|component| {
            component.len() > 1
                || component
                    .first()
                    .is_some_and(|node| digraph.find_edge(*node, *node).is_some())
        })
        .map(|component| {
            let mut names: Vec<String> = component
                .into_iter()
                .map(|idx| digraph[idx].clone())
                .collect();
            names.sort_unstable();
            names
        })
        .collect();
    cycles.sort_unstable();
    cycles
}

fn to_petgraph(graph: &DependencyGraph) -> DiGraph<String, ()> {
    let mut digraph = DiGraph::with_capacity(graph.order(), graph.size());
    let mut index: HashMap<&str, NodeIndex> = HashMap::with_capacity(graph.order());
    for vertex in graph.vertices() {
        index.insert(vertex.as_str(), digraph.add_node(vertex.clone()));
    }
    for vertex in graph.vertices() {
        for dep in graph.adjacent_vertices_of(vertex).unwrap_or_default() {
            if let (Some(&from), Some(&to)) = (index.get(vertex.as_str()), index.get(dep.as_str())) {
                digraph.add_edge(from, to, ());
            }
        }
    }
    digraph
}

#[cfg(test)]
mod tests {
    use super::{dependents_of, find_cycles, roots};
    use crate::graph::DependencyGraph;

    fn graph_with(edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (from, to) in edges {
            graph.add_edge(from, to);
        }
        graph
    }

    #[test]
    fn roots_skip_vertices_with_incoming_edges() {
        let mut graph = graph_with(&[("app", "lib"), ("lib", "core"), ("tool", "core")]);
        graph.add_vertex("standalone");
        assert_eq!(roots(&graph), vec!["app", "tool", "standalone"]);
    }

    #[test]
    fn roots_empty_when_everything_is_in_a_cycle() {
        let graph = graph_with(&[("a", "b"), ("b", "a")]);
        assert!(roots(&graph).is_empty());
    }

    #[test]
    fn dependents_of_lists_direct_dependents_only() {
        let graph = graph_with(&[("app", "lib"), ("lib", "core"), ("tool", "core")]);
        assert_eq!(dependents_of(&graph, "core"), vec!["lib", "tool"]);
        assert!(dependents_of(&graph, "app").is_empty());
    }

    #[test]
    fn find_cycles_reports_components_and_self_loops() {
        let graph = graph_with(&[
            ("a", "b"),
            ("b", "c"),
            ("c", "a"),
            ("d", "d"),
            ("e", "a"),
        ]);
        let cycles = find_cycles(&graph);
        assert_eq!(
            cycles,
            vec![
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
                vec!["d".to_string()],
            ]
        );
    }

    #[test]
    fn find_cycles_empty_for_acyclic_graph() {
        let graph = graph_with(&[("a", "b"), ("a", "c"), ("b", "c")]);
        assert!(find_cycles(&graph).is_empty());
    }
}
