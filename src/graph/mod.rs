use std::collections::{HashMap, HashSet};

pub mod ops;
pub mod resolve;
pub mod viz;

/// Directed package graph. An edge `a -> b` means `a` depends on `b`.
///
/// Vertices keep their insertion order and every adjacency list keeps the
/// order its edges were added in; traversals rely on both.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    vertices: Vec<String>,
    edges: HashMap<String, Vec<String>>,
    edge_count: usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `name` if absent. Adding an existing vertex is a no-op.
    pub fn add_vertex(&mut self, name: &str) {
        if self.edges.contains_key(name) {
            return;
        }
        self.vertices.push(name.to_string());
        self.edges.insert(name.to_string(), Vec::new());
    }

    /// Records `from -> to`, creating either endpoint when missing.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.add_vertex(from);
        self.add_vertex(to);
        if let Some(deps) = self.edges.get_mut(from) {
            if !deps.iter().any(|dep| dep == to) {
                deps.push(to.to_string());
                self.edge_count += 1;
            }
        }
    }

    /// Deletes `name` together with all incoming and outgoing edges.
    pub fn remove_vertex(&mut self, name: &str) {
        let Some(outgoing) = self.edges.remove(name) else {
            return;
        };
        self.edge_count -= outgoing.len();
        self.vertices.retain(|vertex| vertex != name);
        for deps in self.edges.values_mut() {
            let before = deps.len();
            deps.retain(|dep| dep != name);
            self.edge_count -= before - deps.len();
        }
    }

    pub fn remove_edge(&mut self, from: &str, to: &str) {
        if let Some(deps) = self.edges.get_mut(from) {
            if let Some(pos) = deps.iter().position(|dep| dep == to) {
                deps.remove(pos);
                self.edge_count -= 1;
            }
        }
    }

    /// Direct dependencies of `name` in insertion order, or `None` when
    /// `name` is not a vertex.
    pub fn adjacent_vertices_of(&self, name: &str) -> Option<&[String]> {
        self.edges.get(name).map(Vec::as_slice)
    }

    pub fn all_vertices(&self) -> HashSet<&str> {
        self.vertices.iter().map(String::as_str).collect()
    }

    /// Vertices in the order they were first added.
    pub fn vertices(&self) -> &[String] {
        &self.vertices
    }

    /// The stored name of vertex `name`, borrowed from the graph.
    pub fn find_vertex(&self, name: &str) -> Option<&str> {
        self.edges.get_key_value(name).map(|(key, _)| key.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    /// Number of vertices.
    pub fn order(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    pub fn size(&self) -> usize {
        self.edge_count
    }
}
