use crate::node::NodeId;
use ahash::AHashMap;
use std::collections::BTreeMap;
use std::fmt;

/// Port kind used by ordinary data connections.
pub const MAIN: &str = "main";

/// Highest port index a connection may use. Output slots are padded up to the index, so
/// it bounds the table's allocation per port kind.
pub const MAX_PORT_INDEX: usize = 1024;

/// A typed, indexed port on one side of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Port {
    pub kind: String,
    pub index: usize,
}

impl Port {
    pub fn new(kind: &str, index: usize) -> Self {
        Self {
            kind: kind.to_string(),
            index,
        }
    }

    pub fn main(index: usize) -> Self {
        Self::new(MAIN, index)
    }
}

impl Default for Port {
    fn default() -> Self {
        Self::main(0)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.kind, self.index)
    }
}

/// The receiving end of a connection: a target node and its input port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub node: NodeId,
    pub input: Port,
}

/// A directed edge `source.output -> target.input`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub source: NodeId,
    pub output: Port,
    pub target: NodeId,
    pub input: Port,
}

/// Every outgoing edge of one source node: port kind -> output index -> endpoints.
pub type OutputPorts = BTreeMap<String, Vec<Vec<Endpoint>>>;

/// Adjacency table of a workflow, keyed by source node id.
///
/// Fan-out is kept in insertion order per output slot. Empty output slots are kept too,
/// so a document read from disk is written back with the same shape.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTable {
    sources: AHashMap<NodeId, OutputPorts>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an edge. Returns `false` if the identical edge was already present or the
    /// output index is above [`MAX_PORT_INDEX`].
    pub fn insert(&mut self, connection: Connection) -> bool {
        if connection.output.index > MAX_PORT_INDEX {
            return false;
        }
        let slots = self
            .sources
            .entry(connection.source)
            .or_default()
            .entry(connection.output.kind)
            .or_default();
        if slots.len() <= connection.output.index {
            slots.resize_with(connection.output.index + 1, Vec::new);
        }

        let endpoint = Endpoint {
            node: connection.target,
            input: connection.input,
        };
        let slot = &mut slots[connection.output.index];
        if slot.contains(&endpoint) {
            return false;
        }
        slot.push(endpoint);
        true
    }

    /// Replaces the output slots of `kind` on `source` wholesale.
    pub(crate) fn insert_slots(&mut self, source: NodeId, kind: String, slots: Vec<Vec<Endpoint>>) {
        self.sources.entry(source).or_default().insert(kind, slots);
    }

    /// Removes every edge from `source` to `target`, returning how many were removed.
    pub fn remove_between(&mut self, source: &str, target: &str) -> usize {
        let Some(ports) = self.sources.get_mut(source) else {
            return 0;
        };

        let mut removed = 0;
        for slot in ports.values_mut().flatten() {
            let before = slot.len();
            slot.retain(|endpoint| endpoint.node.as_str() != target);
            removed += before - slot.len();
        }

        if ports.values().flatten().all(Vec::is_empty) {
            self.sources.remove(source);
        }
        removed
    }

    pub fn outputs(&self, source: &str) -> Option<&OutputPorts> {
        self.sources.get(source)
    }

    /// Ids of every node that has an entry as a source, sorted for stable reporting.
    pub fn sources(&self) -> Vec<&NodeId> {
        let mut sources: Vec<_> = self.sources.keys().collect();
        sources.sort();
        sources
    }

    /// Outgoing edges of `source`, ordered by port kind, output index, then insertion.
    pub fn edges_from<'a>(&'a self, source: &'a str) -> impl Iterator<Item = Connection> + 'a {
        self.sources
            .get_key_value(source)
            .into_iter()
            .flat_map(|(source_id, ports)| {
                ports.iter().flat_map(move |(kind, slots)| {
                    slots.iter().enumerate().flat_map(move |(index, slot)| {
                        slot.iter().map(move |endpoint| Connection {
                            source: source_id.clone(),
                            output: Port::new(kind, index),
                            target: endpoint.node.clone(),
                            input: endpoint.input.clone(),
                        })
                    })
                })
            })
    }

    /// True if `id` appears on either side of any edge.
    pub fn touches(&self, id: &str) -> bool {
        self.sources.iter().any(|(source, ports)| {
            let has_edges = ports.values().flatten().any(|slot| !slot.is_empty());
            (source.as_str() == id && has_edges)
                || ports
                    .values()
                    .flatten()
                    .flatten()
                    .any(|endpoint| endpoint.node.as_str() == id)
        })
    }

    /// Number of edges in the table.
    pub fn len(&self) -> usize {
        self.sources.values().flat_map(|ports| ports.values()).flatten().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
