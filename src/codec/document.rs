use crate::node::{NodeId, Parameters, Position, TypeVersion};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Borrowed view of a workflow in the execution engine's document shape.
///
/// Field order here is the key order of the written file.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WorkflowDocument<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub nodes: Vec<NodeDocument<'a>>,
    pub connections: ConnectionsDocument<'a>,
    pub active: bool,
    pub settings: &'a Map<String, Value>,
    pub tags: &'a [Value],
    pub created_at: &'a str,
    pub updated_at: &'a str,
    pub pin_data: &'a Map<String, Value>,
    pub meta: &'a Map<String, Value>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NodeDocument<'a> {
    pub id: &'a NodeId,
    pub name: &'a str,
    #[serde(rename = "type")]
    pub node_type: &'a str,
    pub type_version: &'a TypeVersion,
    pub position: Position,
    pub parameters: &'a Parameters,
    #[serde(skip_serializing_if = "is_empty")]
    pub credentials: &'a Parameters,
}

fn is_empty(map: &&Parameters) -> bool {
    map.is_empty()
}

/// `{ "<target name>", "<input kind>", <input index> }`
#[derive(serde::Serialize)]
pub(crate) struct EndpointDocument<'a> {
    pub node: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub index: usize,
}

/// Output slots of one source node, keyed by port kind.
pub(crate) type PortsDocument<'a> = BTreeMap<&'a str, Vec<Vec<EndpointDocument<'a>>>>;

/// Connections keyed by source node name, written in the order they were collected.
pub(crate) struct ConnectionsDocument<'a>(pub Vec<(&'a str, PortsDocument<'a>)>);

impl Serialize for ConnectionsDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (source, ports) in &self.0 {
            map.serialize_entry(source, ports)?;
        }
        map.end()
    }
}
