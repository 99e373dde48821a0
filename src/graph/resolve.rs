//! Installation-order queries over a populated [`DependencyGraph`].
//!
//! Every query walks only the part of the graph reachable from the packages
//! it is asked about, so a cycle elsewhere in the graph never fails an
//! unrelated query.

use std::collections::{HashMap, HashSet};
use std::fmt;

use thiserror::Error;

use crate::config::{CycleCheck, MaxScope, ResolverSettings};
use crate::graph::ops::roots;
use crate::graph::DependencyGraph;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("package not found: {0}")]
    PackageNotFound(String),
    #[error("dependency cycle detected: {0}")]
    CycleDetected(CycleEvidence),
}

/// What proved the cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleEvidence {
    /// Packages along the cycle, first and last entries equal.
    Path(Vec<String>),
    /// The graph has more edges than a forest over its vertices can hold.
    EdgeCount { edges: usize, vertices: usize },
}

impl fmt::Display for CycleEvidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleEvidence::Path(path) => write!(f, "{}", path.join(" -> ")),
            CycleEvidence::EdgeCount { edges, vertices } => write!(
                f,
                "{} dependencies across {} packages cannot form an acyclic forest",
                edges, vertices
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxDependencies {
    pub package: String,
    /// Transitive dependencies, the package itself excluded.
    pub dependency_count: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Visiting,
    Visited,
}

pub struct Resolver<'g> {
    graph: &'g DependencyGraph,
    settings: ResolverSettings,
}

impl<'g> Resolver<'g> {
    pub fn new(graph: &'g DependencyGraph) -> Self {
        Self::with_settings(graph, ResolverSettings::default())
    }

    pub fn with_settings(graph: &'g DependencyGraph, settings: ResolverSettings) -> Self {
        Self { graph, settings }
    }

    /// Packages to install, dependencies first, ending with `package`.
    ///
    /// Dependencies are expanded depth first in the order they were
    /// declared, and a package is emitted once all of its dependencies have
    /// been emitted.
    pub fn installation_order(&self, package: &str) -> Result<Vec<String>> {
        let graph = self.graph;
        let Some(root) = graph.find_vertex(package) else {
            return Err(ResolveError::PackageNotFound(package.to_string()));
        };

        let mut state: HashMap<&'g str, VisitState> = HashMap::new();
        let mut stack: Vec<(&'g str, usize)> = Vec::new();
        let mut order = Vec::new();

        self.enter(root, &mut state, &mut stack)?;
        while let Some(&(node, next)) = stack.last() {
            let deps = graph.adjacent_vertices_of(node).unwrap_or_default();
            let Some(dep) = deps.get(next) else {
                stack.pop();
                state.insert(node, VisitState::Visited);
                order.push(node.to_string());
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            match state.get(dep.as_str()) {
                Some(VisitState::Visited) => {}
                Some(VisitState::Visiting) => {
                    if self.settings.cycle_check == CycleCheck::Path {
                        return Err(cycle_through(&stack, dep));
                    }
                }
                None => self.enter(dep, &mut state, &mut stack)?,
            }
        }

        Ok(order)
    }

    /// One order covering every package, built from the orders of the
    /// root packages with repeated entries dropped after their first
    /// appearance.
    pub fn installation_order_for_all(&self) -> Result<Vec<String>> {
        let graph = self.graph;
        let mut combined = Vec::new();
        for root in roots(graph) {
            combined.extend(self.installation_order(root)?);
        }

        if self.settings.strict_forest && graph.size() > graph.order().saturating_sub(1) {
            return Err(ResolveError::CycleDetected(CycleEvidence::EdgeCount {
                edges: graph.size(),
                vertices: graph.order(),
            }));
        }

        let order = dedup_first(combined);
        if order.len() < graph.order() {
            return Err(self.locate_unrooted_cycle(&order));
        }
        Ok(order)
    }

    /// Packages `new_package` still needs when `installed_package` and its
    /// dependencies are already present, in installation order.
    pub fn to_install(&self, new_package: &str, installed_package: &str) -> Result<Vec<String>> {
        let installed = self.installation_order(installed_package)?;
        let wanted = self.installation_order(new_package)?;
        let installed: HashSet<String> = installed.into_iter().collect();
        Ok(wanted
            .into_iter()
            .filter(|package| !installed.contains(package))
            .collect())
    }

    /// The package with the most transitive dependencies. Ties keep the
    /// package that comes first in vertex order.
    pub fn package_with_max_dependencies(&self) -> Result<Option<MaxDependencies>> {
        let candidates: Vec<&str> = match self.settings.max_scope {
            MaxScope::All => self.graph.vertices().iter().map(String::as_str).collect(),
            MaxScope::Roots => roots(self.graph),
        };

        let mut best: Option<MaxDependencies> = None;
        for package in candidates {
            let count = self.installation_order(package)?.len() - 1;
            if best
                .as_ref()
                .map_or(true, |current| count > current.dependency_count)
            {
                best = Some(MaxDependencies {
                    package: package.to_string(),
                    dependency_count: count,
                });
            }
        }
        Ok(best)
    }

    fn enter(
        &self,
        node: &'g str,
        state: &mut HashMap<&'g str, VisitState>,
        stack: &mut Vec<(&'g str, usize)>,
    ) -> Result<()> {
        if self.settings.cycle_check == CycleCheck::Adjacent {
            self.check_adjacent(node)?;
        }
        state.insert(node, VisitState::Visiting);
        stack.push((node, 0));
        Ok(())
    }

    // A dependency that lists `node` among its own dependencies.
    fn check_adjacent(&self, node: &str) -> Result<()> {
        for dep in self.graph.adjacent_vertices_of(node).unwrap_or_default() {
            let back = self
                .graph
                .adjacent_vertices_of(dep)
                .unwrap_or_default()
                .iter()
                .any(|next| next == node);
            if back {
                let mut path = vec![node.to_string(), dep.clone()];
                if dep != node {
                    path.push(node.to_string());
                }
                return Err(ResolveError::CycleDetected(CycleEvidence::Path(path)));
            }
        }
        Ok(())
    }

    fn locate_unrooted_cycle(&self, reached: &[String]) -> ResolveError {
        let reached: HashSet<&str> = reached.iter().map(String::as_str).collect();
        let path_check = Resolver::with_settings(
            self.graph,
            ResolverSettings {
                cycle_check: CycleCheck::Path,
                ..self.settings.clone()
            },
        );
        let unreached: Vec<&String> = self
            .graph
            .vertices()
            .iter()
            .filter(|vertex| !reached.contains(vertex.as_str()))
            .collect();
        for vertex in &unreached {
            if let Err(err @ ResolveError::CycleDetected(_)) = path_check.installation_order(vertex)
            {
                return err;
            }
        }
        ResolveError::CycleDetected(CycleEvidence::Path(
            unreached.into_iter().cloned().collect(),
        ))
    }
}

fn cycle_through(stack: &[(&str, usize)], dep: &str) -> ResolveError {
    let start = stack.iter().position(|(node, _)| *node == dep).unwrap_or(0);
    let mut path: Vec<String> = stack[start..]
        .iter()
        .map(|(node, _)| node.to_string())
        .collect();
    path.push(dep.to_string());
    ResolveError::CycleDetected(CycleEvidence::Path(path))
}

fn dedup_first(packages: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    packages
        .into_iter()
        .filter(|package| seen.insert(package.clone()))
        .collect()
}
