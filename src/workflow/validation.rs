use super::Workflow;
use crate::node::{Node, NodeId};
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;

impl Workflow {
    /// Checks the graph's structure and reports every finding; an empty list means valid.
    ///
    /// Checks run in a fixed order and all of them run, even after a failure:
    /// 1. the workflow has at least one node,
    /// 2. every connection endpoint resolves to a node,
    /// 3. the connection graph has no cycles,
    /// 4. node names are unique (connections are written keyed by name).
    ///
    /// Never fails. Orphan nodes are not errors; see [`Workflow::warnings`].
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.nodes.is_empty() {
            errors.push("workflow has no nodes".to_string());
        }

        let index = self.node_index();
        errors.extend(self.dangling_endpoints(&index));
        errors.extend(self.find_cycles(&index).into_iter().map(|cycle| {
            format!("circular dependency detected: {}", cycle.join(" -> "))
        }));
        errors.extend(
            self.nodes
                .iter()
                .map(|n| n.name())
                .duplicates()
                .map(|name| format!("duplicate node name '{}'", name)),
        );

        if !errors.is_empty() {
            tracing::warn!(
                workflow = %self.name,
                "validation found {} problem(s): {}",
                errors.len(),
                errors.join("; ")
            );
        }
        errors
    }

    /// Soft findings that do not block export: nodes with no edges in a multi-node workflow.
    pub fn warnings(&self) -> Vec<String> {
        if self.nodes.len() < 2 {
            return Vec::new();
        }

        let mut touched: AHashSet<NodeId> = AHashSet::new();
        for source in self.connections.sources() {
            for edge in self.connections.edges_from(source.as_str()) {
                touched.insert(edge.source);
                touched.insert(edge.target);
            }
        }

        self.nodes
            .iter()
            .filter(|n| !touched.contains(n.id()))
            .map(|n| format!("node '{}' is not connected to any other node", n.name()))
            .collect()
    }

    /// Id -> node lookup built once per validation pass.
    fn node_index(&self) -> AHashMap<&str, &Node> {
        self.nodes.iter().map(|n| (n.id().as_str(), n)).collect()
    }

    fn dangling_endpoints(&self, index: &AHashMap<&str, &Node>) -> Vec<String> {
        let mut errors = Vec::new();
        for source in self.connections.sources() {
            let Some(source_node) = index.get(source.as_str()) else {
                errors.push(format!("connection source '{}' does not exist", source));
                continue;
            };
            for edge in self.connections.edges_from(source.as_str()) {
                if !index.contains_key(edge.target.as_str()) {
                    errors.push(format!(
                        "connection target '{}' (from '{}') does not exist",
                        edge.target,
                        source_node.name()
                    ));
                }
            }
        }
        errors
    }

    /// Depth-first search tracking the current path. Each edge that leads back onto the
    /// path closes one cycle, reported as node names from the re-entered node around to
    /// itself.
    fn find_cycles(&self, index: &AHashMap<&str, &Node>) -> Vec<Vec<String>> {
        let adjacency: AHashMap<&str, Vec<NodeId>> = self
            .nodes
            .iter()
            .map(|n| {
                let targets = self
                    .connections
                    .edges_from(n.id().as_str())
                    .map(|edge| edge.target)
                    .filter(|target| index.contains_key(target.as_str()))
                    .unique()
                    .collect();
                (n.id().as_str(), targets)
            })
            .collect();

        let mut search = CycleSearch {
            adjacency: &adjacency,
            path: Vec::new(),
            on_path: AHashSet::new(),
            done: AHashSet::new(),
            cycles: Vec::new(),
        };
        for node in &self.nodes {
            if !search.done.contains(node.id().as_str()) {
                search.visit(node.id().as_str());
            }
        }

        search
            .cycles
            .into_iter()
            .map(|cycle| {
                cycle
                    .into_iter()
                    .map(|id| index.get(id.as_str()).map_or(id.clone(), |n| n.name().to_string()))
                    .collect()
            })
            .collect()
    }
}

struct CycleSearch<'a> {
    adjacency: &'a AHashMap<&'a str, Vec<NodeId>>,
    path: Vec<&'a str>,
    on_path: AHashSet<&'a str>,
    done: AHashSet<&'a str>,
    cycles: Vec<Vec<String>>,
}

impl<'a> CycleSearch<'a> {
    /// Walks everything reachable from `root` with an explicit stack of
    /// `(node, next target index)` frames, so path depth is bounded by the heap.
    fn visit(&mut self, root: &'a str) {
        let adjacency = self.adjacency;
        let mut stack: Vec<(&'a str, usize)> = vec![(root, 0)];
        self.path.push(root);
        self.on_path.insert(root);

        while let Some(frame) = stack.last_mut() {
            let (id, next) = *frame;
            let targets = adjacency.get(id).map(Vec::as_slice).unwrap_or_default();

            let Some(target) = targets.get(next) else {
                stack.pop();
                self.on_path.remove(id);
                self.path.pop();
                self.done.insert(id);
                continue;
            };
            frame.1 += 1;

            let target = target.as_str();
            if self.on_path.contains(target) {
                let start = self.path.iter().position(|p| *p == target).unwrap_or(0);
                let mut cycle: Vec<String> =
                    self.path[start..].iter().map(|p| p.to_string()).collect();
                cycle.push(target.to_string());
                self.cycles.push(cycle);
            } else if !self.done.contains(target) {
                self.path.push(target);
                self.on_path.insert(target);
                stack.push((target, 0));
            }
        }
    }
}
