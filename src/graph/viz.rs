use crate::graph::DependencyGraph;

/// Box-drawn dependency tree under each root. Packages already on the
/// current branch are marked `(cycle)` and not expanded again.
pub fn render_tree(graph: &DependencyGraph, roots: &[&str]) -> String {
    let mut out = String::new();
    for (idx, root) in roots.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(root);
        out.push('\n');
        let mut path = vec![*root];
        render_tree_children(graph, root, "", &mut path, &mut out);
    }
    out
}

/// Two-space indented dependency listing under each root.
pub fn render_flat(graph: &DependencyGraph, roots: &[&str]) -> String {
    let mut out = String::new();
    for (idx, root) in roots.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(root);
        out.push('\n');
        let mut path = vec![*root];
        render_flat_children(graph, root, 1, &mut path, &mut out);
    }
    out
}

pub fn render_dot(graph: &DependencyGraph) -> String {
    let mut out = String::from("digraph packages {\n");
    for vertex in graph.vertices() {
        out.push_str(&format!("  \"{}\";\n", escape_dot_label(vertex)));
    }
    for vertex in graph.vertices() {
        for dep in graph.adjacent_vertices_of(vertex).unwrap_or_default() {
            out.push_str(&format!(
                "  \"{}\" -> \"{}\";\n",
                escape_dot_label(vertex),
                escape_dot_label(dep)
            ));
        }
    }
    out.push_str("}\n");
    out
}

fn render_tree_children<'g>(
    graph: &'g DependencyGraph,
    node: &str,
    prefix: &str,
    path: &mut Vec<&'g str>,
    out: &mut String,
) {
    let children = graph.adjacent_vertices_of(node).unwrap_or_default();
    for (idx, child) in children.iter().enumerate() {
        let is_last = idx + 1 == children.len();
        out.push_str(prefix);
        out.push_str(if is_last { "`-- " } else { "|-- " });
        out.push_str(child);
        if path.iter().any(|id| id == child) {
            out.push_str(" (cycle)\n");
            continue;
        }
        out.push('\n');
        path.push(child);
        let mut next_prefix = prefix.to_string();
        next_prefix.push_str(if is_last { "    " } else { "|   " });
        render_tree_children(graph, child, &next_prefix, path, out);
        path.pop();
    }
}

fn render_flat_children<'g>(
    graph: &'g DependencyGraph,
    node: &str,
    depth: usize,
    path: &mut Vec<&'g str>,
    out: &mut String,
) {
    for child in graph.adjacent_vertices_of(node).unwrap_or_default() {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(child);
        if path.iter().any(|id| id == child) {
            out.push_str(" (cycle)\n");
            continue;
        }
        out.push('\n');
        path.push(child);
        render_flat_children(graph, child, depth + 1, path, out);
        path.pop();
    }
}

fn escape_dot_label(label: &str) -> String {
    label.replace('"', "\\\"")
}
