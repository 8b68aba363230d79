use crate::error::{ConnectionError, WorkflowError};
use crate::node::{Node, NodeId, Position};
use ahash::AHashMap;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

pub mod connection;
mod io;
mod validation;

pub use connection::{
    Connection, ConnectionTable, Endpoint, MAIN, MAX_PORT_INDEX, OutputPorts, Port,
};

/// Coarse lifecycle of a workflow, derived from its contents.
///
/// Exporting is an observation and never moves a workflow out of its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Empty,
    Populated,
    Connected,
}

/// Grid used to place nodes that were added without a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    pub origin: Position,
    pub column_spacing: i64,
    pub row_spacing: i64,
    pub columns: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            origin: Position::new(0, 0),
            column_spacing: 220,
            row_spacing: 200,
            columns: 5,
        }
    }
}

impl LayoutOptions {
    /// Position of the `index`-th node, filling rows left to right.
    pub fn position_for(&self, index: usize) -> Position {
        let columns = self.columns.max(1);
        let column = (index % columns) as i64;
        let row = (index / columns) as i64;
        Position::new(
            self.origin.x + column * self.column_spacing,
            self.origin.y + row * self.row_spacing,
        )
    }
}

/// A directed graph of nodes, the unit of validation and export.
///
/// Nodes keep their insertion order, which drives both the default layout and the order of
/// the exported document. A workflow has a single owner; it does no internal locking.
#[derive(Debug, Clone)]
pub struct Workflow {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) nodes: Vec<Node>,
    pub(crate) connections: ConnectionTable,
    pub(crate) active: bool,
    pub(crate) settings: Map<String, Value>,
    pub(crate) tags: Vec<Value>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
    pub(crate) pin_data: Map<String, Value>,
    pub(crate) meta: Map<String, Value>,
    layout: LayoutOptions,
    /// Position in `nodes` by id, and of the first node carrying each name.
    by_id: AHashMap<NodeId, usize>,
    by_name: AHashMap<String, usize>,
}

impl Workflow {
    /// Creates an empty workflow with a random id.
    pub fn new(name: &str) -> Result<Self, WorkflowError> {
        Self::with_id(name, &uuid::Uuid::new_v4().to_string())
    }

    pub fn with_id(name: &str, id: &str) -> Result<Self, WorkflowError> {
        let name = name.trim();
        if name.is_empty() {
            tracing::error!("refusing to create workflow with an empty name");
            return Err(WorkflowError::InvalidName);
        }

        let now = timestamp();
        let mut meta = Map::new();
        meta.insert("instanceId".to_string(), Value::String(id.to_string()));

        tracing::info!(workflow_id = %id, "created workflow '{}'", name);

        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            nodes: Vec::new(),
            connections: ConnectionTable::new(),
            active: true,
            settings: Map::new(),
            tags: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
            pin_data: Map::new(),
            meta,
            layout: LayoutOptions::default(),
            by_id: AHashMap::new(),
            by_name: AHashMap::new(),
        })
    }

    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    /// Registers a node, placing it on the layout grid if it has no position yet.
    ///
    /// Fails if a node with the same id is already present; the existing node is untouched.
    pub fn add_node(&mut self, mut node: Node) -> Result<NodeId, WorkflowError> {
        if self.contains(node.id().as_str()) {
            tracing::error!(
                workflow = %self.name,
                node_id = %node.id(),
                "failed to add node: id already exists"
            );
            return Err(WorkflowError::DuplicateNode {
                id: node.id().to_string(),
            });
        }

        if self.node_by_name(node.name()).is_some() {
            tracing::warn!(
                workflow = %self.name,
                "node with name '{}' already exists in workflow",
                node.name()
            );
        }

        if node.position().is_none() {
            node.set_position(self.layout.position_for(self.nodes.len()));
        }

        tracing::debug!(
            workflow = %self.name,
            node_id = %node.id(),
            node_type = %node.node_type(),
            "added node '{}'",
            node.name()
        );

        let id = node.id().clone();
        let position = self.nodes.len();
        self.by_id.insert(id.clone(), position);
        self.by_name.entry(node.name().to_string()).or_insert(position);
        self.nodes.push(node);
        self.touch();
        Ok(id)
    }

    /// Adds nodes one at a time, in order.
    ///
    /// Not transactional: if the third node is rejected, the first two stay added.
    pub fn add_nodes<I>(&mut self, nodes: I) -> Result<Vec<NodeId>, WorkflowError>
    where
        I: IntoIterator<Item = Node>,
    {
        nodes.into_iter().map(|node| self.add_node(node)).collect()
    }

    /// Removes a node. Edges touching it stay in the table until disconnected, and
    /// `validate` reports them.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let index = *self.by_id.get(id)?;
        let node = self.nodes.remove(index);
        self.reindex();
        tracing::debug!(workflow = %self.name, node_id = %id, "removed node '{}'", node.name());
        self.touch();
        Some(node)
    }

    /// Connects `source` output `main[0]` to `target` input `main[0]`.
    pub fn connect(
        &mut self,
        source: impl AsRef<str>,
        target: impl AsRef<str>,
    ) -> Result<(), ConnectionError> {
        self.connect_ports(source, target, Port::default(), Port::default())
    }

    /// Connects two member nodes over explicit ports.
    ///
    /// Checks membership and that both ports have a kind and an index no higher than
    /// [`MAX_PORT_INDEX`]. Cycles, self-loops included, are reported by `validate`.
    pub fn connect_ports(
        &mut self,
        source: impl AsRef<str>,
        target: impl AsRef<str>,
        output: Port,
        input: Port,
    ) -> Result<(), ConnectionError> {
        let (source, target) = (source.as_ref(), target.as_ref());

        let Some(source_node) = self.node(source) else {
            tracing::error!(workflow = %self.name, "failed to connect: source '{}' is not in the workflow", source);
            return Err(ConnectionError::SourceNotFound(source.to_string()));
        };
        let Some(target_node) = self.node(target) else {
            tracing::error!(workflow = %self.name, "failed to connect: target '{}' is not in the workflow", target);
            return Err(ConnectionError::TargetNotFound(target.to_string()));
        };
        if output.kind.trim().is_empty() || output.index > MAX_PORT_INDEX {
            tracing::error!(workflow = %self.name, "failed to connect: invalid output port {}", output);
            return Err(ConnectionError::InvalidPort {
                node_id: source.to_string(),
                side: "output",
            });
        }
        if input.kind.trim().is_empty() || input.index > MAX_PORT_INDEX {
            tracing::error!(workflow = %self.name, "failed to connect: invalid input port {}", input);
            return Err(ConnectionError::InvalidPort {
                node_id: target.to_string(),
                side: "input",
            });
        }

        tracing::debug!(
            workflow = %self.name,
            "connected '{}' to '{}' (output: {} -> input: {})",
            source_node.name(),
            target_node.name(),
            output,
            input
        );

        let connection = Connection {
            source: source_node.id().clone(),
            output,
            target: target_node.id().clone(),
            input,
        };
        if self.connections.insert(connection) {
            self.touch();
        }
        Ok(())
    }

    /// Removes every edge from `source` to `target`. Returns the number removed.
    pub fn disconnect(&mut self, source: impl AsRef<str>, target: impl AsRef<str>) -> usize {
        let removed = self
            .connections
            .remove_between(source.as_ref(), target.as_ref());
        if removed > 0 {
            self.touch();
        }
        removed
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.by_id.get(id).and_then(|&i| self.nodes.get(i))
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let index = *self.by_id.get(id)?;
        self.nodes.get_mut(index)
    }

    /// First node carrying `name`.
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.by_name.get(name).and_then(|&i| self.nodes.get(i))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn connections(&self) -> &ConnectionTable {
        &self.connections
    }

    pub fn state(&self) -> WorkflowState {
        if self.nodes.is_empty() {
            WorkflowState::Empty
        } else if self.connections.is_empty() {
            WorkflowState::Populated
        } else {
            WorkflowState::Connected
        }
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        self.touch();
    }

    pub fn settings(&self) -> &Map<String, Value> {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.settings
    }

    pub fn tags(&self) -> &[Value] {
        &self.tags
    }

    pub fn add_tag(&mut self, tag: &str) {
        self.tags.push(Value::String(tag.to_string()));
        self.touch();
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn updated_at(&self) -> &str {
        &self.updated_at
    }

    pub fn pin_data(&self) -> &Map<String, Value> {
        &self.pin_data
    }

    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }

    fn reindex(&mut self) {
        self.by_id.clear();
        self.by_name.clear();
        for (position, node) in self.nodes.iter().enumerate() {
            self.by_id.insert(node.id().clone(), position);
            self.by_name.entry(node.name().to_string()).or_insert(position);
        }
    }

    fn touch(&mut self) {
        self.updated_at = timestamp();
    }
}

/// RFC 3339 UTC timestamp with millisecond precision, e.g. `2025-01-31T09:15:00.000Z`.
fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_wraps_rows() {
        let layout = LayoutOptions {
            columns: 2,
            ..LayoutOptions::default()
        };
        assert_eq!(layout.position_for(0), Position::new(0, 0));
        assert_eq!(layout.position_for(1), Position::new(220, 0));
        assert_eq!(layout.position_for(2), Position::new(0, 200));
    }

    #[test]
    fn timestamps_are_utc_millis() {
        let ts = timestamp();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2025-01-31T09:15:00.000Z".len());
    }
}
