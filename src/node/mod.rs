use crate::error::NodeError;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::borrow::Borrow;
use std::fmt;

pub mod id;

pub use id::{IdGenerator, SequentialIds, UuidIds};

/// Open-ended parameter payload of a node. Any JSON value can be stored under a key.
pub type Parameters = Map<String, Value>;

/// Identity of a node, unique within the workflow that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Version of a node kind's parameter schema.
///
/// Whole versions are written as integers (`1`) and fractional ones as decimals (`4.2`),
/// which is how the execution engine writes them itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeVersion(Number);

impl TypeVersion {
    /// Returns `None` for values the document format cannot carry (NaN, infinities, zero or less).
    pub fn new(version: f64) -> Option<Self> {
        if !version.is_finite() || version <= 0.0 {
            return None;
        }
        // i64::MAX rounds up to 2^63 as f64, so the bound is exclusive.
        if version.fract() == 0.0 && version < i64::MAX as f64 {
            Some(Self(Number::from(version as i64)))
        } else {
            Number::from_f64(version).map(Self)
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.0.as_f64().unwrap_or(1.0)
    }

    pub(crate) fn from_number(number: &Number) -> Option<Self> {
        if let Some(whole) = number.as_u64() {
            return (whole > 0).then(|| Self(Number::from(whole)));
        }
        number.as_f64().and_then(Self::new)
    }
}

impl Default for TypeVersion {
    fn default() -> Self {
        Self(Number::from(1))
    }
}

impl From<u32> for TypeVersion {
    fn from(value: u32) -> Self {
        Self(Number::from(value.max(1)))
    }
}

impl fmt::Display for TypeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canvas coordinates of a node. Purely cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.x, self.y].serialize(serializer)
    }
}

impl From<[i64; 2]> for Position {
    fn from([x, y]: [i64; 2]) -> Self {
        Self { x, y }
    }
}

/// A typed, parameterized step in a workflow.
///
/// `id` and `node_type` are fixed once the node is built; parameters, credentials and
/// position stay editable. A node belongs to at most one workflow: adding it moves it in,
/// and a clone added elsewhere is an independent copy that merely shares the id.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    node_type: String,
    name: String,
    type_version: TypeVersion,
    parameters: Parameters,
    position: Option<Position>,
    credentials: Parameters,
}

impl Node {
    /// Creates a node with an id from the default sequential generator.
    pub fn new(node_type: &str, name: &str) -> Result<Self, NodeError> {
        NodeBuilder::new(node_type, name).build()
    }

    pub fn builder(node_type: &str, name: &str) -> NodeBuilder {
        NodeBuilder::new(node_type, name)
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_version(&self) -> &TypeVersion {
        &self.type_version
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    /// Stores any serializable value under `key`, replacing a previous one.
    pub fn set_parameter<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), NodeError> {
        let value = to_json(key, value)?;
        self.parameters.insert(key.to_string(), value);
        Ok(())
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = Some(position);
    }

    pub fn credentials(&self) -> &Parameters {
        &self.credentials
    }

    pub fn set_credential<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), NodeError> {
        let value = to_json(key, value)?;
        self.credentials.insert(key.to_string(), value);
        Ok(())
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.node_type, self.id)
    }
}

fn to_json<T: Serialize>(key: &str, value: T) -> Result<Value, NodeError> {
    serde_json::to_value(value).map_err(|e| NodeError::InvalidParameters {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Checks that a type tag has the `package.kind` shape the execution engine expects.
pub fn check_node_type(node_type: &str) -> Result<(), NodeError> {
    let invalid = |reason: &str| NodeError::InvalidType {
        type_name: node_type.to_string(),
        reason: reason.to_string(),
    };

    if node_type.is_empty() {
        return Err(invalid("type cannot be empty"));
    }
    if node_type.chars().any(char::is_whitespace) {
        return Err(invalid("type cannot contain whitespace"));
    }
    match node_type.rsplit_once('.') {
        Some((package, kind)) if !package.is_empty() && !kind.is_empty() => Ok(()),
        _ => Err(invalid("expected the form 'package.kind'")),
    }
}

/// Builder for `Node`, validating type and name when built.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    node_type: String,
    name: String,
    id: Option<NodeId>,
    type_version: TypeVersion,
    parameters: Parameters,
    position: Option<Position>,
    credentials: Parameters,
}

impl NodeBuilder {
    pub fn new(node_type: &str, name: &str) -> Self {
        Self {
            node_type: node_type.trim().to_string(),
            name: name.trim().to_string(),
            id: None,
            type_version: TypeVersion::default(),
            parameters: Parameters::new(),
            position: None,
            credentials: Parameters::new(),
        }
    }

    pub fn id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn type_version(mut self, version: TypeVersion) -> Self {
        self.type_version = version;
        self
    }

    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn parameter(mut self, key: &str, value: Value) -> Self {
        self.parameters.insert(key.to_string(), value);
        self
    }

    pub fn position(mut self, position: impl Into<Position>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn credentials(mut self, credentials: Parameters) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn build(self) -> Result<Node, NodeError> {
        self.build_with(&id::DEFAULT_IDS)
    }

    /// Builds the node, drawing an id from `ids` unless one was set explicitly.
    pub fn build_with(self, ids: &dyn IdGenerator) -> Result<Node, NodeError> {
        check_node_type(&self.node_type)?;
        if self.name.is_empty() {
            return Err(NodeError::MissingField("name"));
        }

        let id = match self.id {
            Some(id) if id.as_str().trim().is_empty() => return Err(NodeError::MissingField("id")),
            Some(id) => id,
            None => ids.next_id(&self.name),
        };

        tracing::debug!(node_id = %id, node_type = %self.node_type, "created node '{}'", self.name);

        Ok(Node {
            id,
            node_type: self.node_type,
            name: self.name,
            type_version: self.type_version,
            parameters: self.parameters,
            position: self.position,
            credentials: self.credentials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_version_keeps_integers_integral() {
        assert_eq!(TypeVersion::new(1.0).unwrap().to_string(), "1");
        assert_eq!(TypeVersion::new(4.2).unwrap().to_string(), "4.2");
        assert!(TypeVersion::new(f64::NAN).is_none());
        assert!(TypeVersion::new(0.0).is_none());
    }

    #[test]
    fn node_type_shape() {
        assert!(check_node_type("n8n-nodes-base.httpRequest").is_ok());
        assert!(check_node_type("@n8n/n8n-nodes-langchain.agent").is_ok());
        assert!(check_node_type("httpRequest").is_err());
        assert!(check_node_type("n8n-nodes-base.").is_err());
        assert!(check_node_type(".httpRequest").is_err());
        assert!(check_node_type("n8n nodes.http").is_err());
    }

    #[test]
    fn position_serializes_as_pair() {
        let json = serde_json::to_string(&Position::new(-288, 16)).unwrap();
        assert_eq!(json, "[-288,16]");
    }
}
