//! Mapping between the in-memory workflow model and the execution engine's JSON document.
//!
//! The document keys connections by source node *name*, not id, so encoding resolves ids to
//! names and decoding resolves them back. Encoding then decoding then encoding again yields
//! byte-identical output.

use crate::error::{ExportError, ImportError};
use crate::node::NodeId;
use crate::workflow::Workflow;
use serde_json::Value;

mod decode;
mod document;

use document::{
    ConnectionsDocument, EndpointDocument, NodeDocument, PortsDocument, WorkflowDocument,
};

pub use decode::decode;

/// Knobs for writing a workflow to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Indent the document with two spaces.
    pub pretty: bool,
    /// Run `Workflow::validate` first and refuse to write on any finding.
    pub validate: bool,
    /// Create missing parent directories of the target path.
    pub create_parent_dirs: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            validate: true,
            create_parent_dirs: true,
        }
    }
}

impl ExportOptions {
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn with_parent_dirs(mut self, create: bool) -> Self {
        self.create_parent_dirs = create;
        self
    }
}

/// Serializes a workflow to a JSON string in the engine's document shape.
pub fn encode(workflow: &Workflow, pretty: bool) -> Result<String, ExportError> {
    let document = build_document(workflow)?;
    let json = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    Ok(json)
}

/// Same document as [`encode`], as a `serde_json::Value` for inspection.
pub fn to_value(workflow: &Workflow) -> Result<Value, ExportError> {
    let document = build_document(workflow)?;
    Ok(serde_json::to_value(&document)?)
}

fn build_document(workflow: &Workflow) -> Result<WorkflowDocument<'_>, ExportError> {
    if let Some(orphaned) = workflow
        .connections
        .sources()
        .into_iter()
        .find(|source| !workflow.contains(source.as_str()))
    {
        return Err(ExportError::UnresolvedNode(orphaned.to_string()));
    }

    // Sources in node order, so the output does not depend on table iteration order.
    let mut connections = Vec::new();
    for node in &workflow.nodes {
        let Some(outputs) = workflow.connections.outputs(node.id().as_str()) else {
            continue;
        };

        let mut ports = PortsDocument::new();
        for (kind, slots) in outputs {
            let mut slot_documents = Vec::with_capacity(slots.len());
            for slot in slots {
                let endpoints = slot
                    .iter()
                    .map(|endpoint| {
                        Ok(EndpointDocument {
                            node: name_of(workflow, &endpoint.node)?,
                            kind: endpoint.input.kind.as_str(),
                            index: endpoint.input.index,
                        })
                    })
                    .collect::<Result<Vec<_>, ExportError>>()?;
                slot_documents.push(endpoints);
            }
            ports.insert(kind.as_str(), slot_documents);
        }
        connections.push((node.name(), ports));
    }

    let nodes = workflow
        .nodes
        .iter()
        .map(|node| NodeDocument {
            id: node.id(),
            name: node.name(),
            node_type: node.node_type(),
            type_version: node.type_version(),
            position: node.position().unwrap_or_default(),
            parameters: node.parameters(),
            credentials: node.credentials(),
        })
        .collect();

    Ok(WorkflowDocument {
        id: &workflow.id,
        name: &workflow.name,
        nodes,
        connections: ConnectionsDocument(connections),
        active: workflow.active,
        settings: &workflow.settings,
        tags: &workflow.tags,
        created_at: &workflow.created_at,
        updated_at: &workflow.updated_at,
        pin_data: &workflow.pin_data,
        meta: &workflow.meta,
    })
}

fn name_of<'w>(workflow: &'w Workflow, id: &NodeId) -> Result<&'w str, ExportError> {
    workflow
        .node(id.as_str())
        .map(|n| n.name())
        .ok_or_else(|| ExportError::UnresolvedNode(id.to_string()))
}

/// Parses a JSON string and decodes it into a workflow.
pub fn decode_str(json: &str) -> Result<Workflow, ImportError> {
    let value: Value = serde_json::from_str(json)?;
    decode(value)
}
