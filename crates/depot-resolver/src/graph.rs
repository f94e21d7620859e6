//! Closure graph construction and rendering.
//!
//! The resolution engine itself is set-based; this graph exists for the
//! diagnostic surface: printing a resolved closure as a tree and answering
//! "how did this dependency get here" path queries.

use std::collections::{BTreeSet, HashMap, HashSet};

use depot_core::Coordinate;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

/// A resolved closure as a directed graph rooted at the requested version.
pub struct ClosureGraph {
    graph: DiGraph<Coordinate, ()>,
    index: HashMap<Coordinate, NodeIndex>,
    root: NodeIndex,
}

impl ClosureGraph {
    /// Build the graph for a closure. `direct` supplies the direct
    /// dependencies of each member; edges are kept only between closure
    /// members (plus the root).
    pub fn build(
        root: &Coordinate,
        closure: &BTreeSet<Coordinate>,
        direct: &dyn Fn(&Coordinate) -> Vec<Coordinate>,
    ) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        let root_idx = graph.add_node(root.clone());
        index.insert(root.clone(), root_idx);
        for member in closure {
            if !index.contains_key(member) {
                let idx = graph.add_node(member.clone());
                index.insert(member.clone(), idx);
            }
        }

        let nodes: Vec<Coordinate> = index.keys().cloned().collect();
        for node in nodes {
            let from = index[&node];
            for dep in direct(&node) {
                if let Some(&to) = index.get(&dep) {
                    if !graph.edges(from).any(|e| e.target() == to) {
                        graph.add_edge(from, to, ());
                    }
                }
            }
        }

        Self {
            graph,
            index,
            root: root_idx,
        }
    }

    /// Number of nodes excluding the root.
    pub fn len(&self) -> usize {
        self.graph.node_count().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the closure as an indented tree.
    pub fn print_tree(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", self.graph[self.root]));

        let mut visited = HashSet::new();
        visited.insert(self.root);

        let deps = self.children(self.root);
        let count = deps.len();
        for (i, child) in deps.iter().enumerate() {
            self.print_subtree(&mut output, *child, "", i == count - 1, &mut visited);
        }
        output
    }

    fn print_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        output.push_str(&format!("{prefix}{connector}{}\n", self.graph[idx]));

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let deps = self.children(idx);
        let count = deps.len();
        for (i, child) in deps.iter().enumerate() {
            self.print_subtree(output, *child, &child_prefix, i == count - 1, visited);
        }

        visited.remove(&idx);
    }

    /// Find a path from the root to a specific coordinate.
    pub fn find_path(&self, target: &Coordinate) -> Option<Vec<Coordinate>> {
        let target_idx = *self.index.get(target)?;
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        if self.dfs_path(self.root, target_idx, &mut path, &mut visited) {
            Some(path.iter().map(|&idx| self.graph[idx].clone()).collect())
        } else {
            None
        }
    }

    fn dfs_path(
        &self,
        current: NodeIndex,
        target: NodeIndex,
        path: &mut Vec<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        path.push(current);
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            path.pop();
            return false;
        }
        for child in self.children(current) {
            if self.dfs_path(child, target, path, visited) {
                return true;
            }
        }
        path.pop();
        false
    }

    fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .edges(idx)
            .map(|e| e.target())
            .collect();
        children.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
        children
    }
}
