//! Typed builders for the node kinds most workflows start from.
//!
//! Each builder shapes its fields into the parameter layout the execution engine expects
//! for that kind, then converts into a plain [`Node`] through [`IntoNode`].

use crate::error::NodeError;
use crate::node::{Node, NodeBuilder, NodeId, Parameters, Position, TypeVersion};
use serde_json::{Value, json};

/// Conversion of a typed builder into a plain node.
///
/// Implement this on your own structs to plug custom node kinds into
/// `Workflow::add_node` without going through `Node::builder` by hand.
///
/// ```rust
/// use flowsmith::catalog::IntoNode;
/// use flowsmith::error::NodeError;
/// use flowsmith::node::Node;
///
/// struct Slack { channel: String, text: String }
///
/// impl IntoNode for Slack {
///     fn into_node(self) -> Result<Node, NodeError> {
///         Node::builder("n8n-nodes-base.slack", "Post to Slack")
///             .parameter("channel", self.channel.into())
///             .parameter("text", self.text.into())
///             .build()
///     }
/// }
/// ```
pub trait IntoNode {
    fn into_node(self) -> Result<Node, NodeError>;
}

impl IntoNode for Node {
    fn into_node(self) -> Result<Node, NodeError> {
        Ok(self)
    }
}

impl IntoNode for NodeBuilder {
    fn into_node(self) -> Result<Node, NodeError> {
        self.build()
    }
}

/// Name, explicit id and position shared by every builder.
#[derive(Debug, Clone, Default)]
struct Common {
    name: String,
    id: Option<NodeId>,
    position: Option<Position>,
}

impl Common {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    fn builder(self, node_type: &str, version: TypeVersion) -> NodeBuilder {
        let mut builder = Node::builder(node_type, &self.name).type_version(version);
        if let Some(id) = self.id {
            builder = builder.id(id);
        }
        if let Some(position) = self.position {
            builder = builder.position(position);
        }
        builder
    }
}

macro_rules! common_setters {
    ($builder:ident) => {
        impl $builder {
            pub fn name(mut self, name: &str) -> Self {
                self.common.name = name.to_string();
                self
            }

            pub fn id(mut self, id: impl Into<NodeId>) -> Self {
                self.common.id = Some(id.into());
                self
            }

            pub fn position(mut self, position: impl Into<Position>) -> Self {
                self.common.position = Some(position.into());
                self
            }
        }
    };
}

/// `[{name, value}, ...]` wrapped the way the engine stores key/value lists.
fn name_value_list(pairs: &[(String, String)]) -> Value {
    let parameters: Vec<Value> = pairs
        .iter()
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect();
    json!({ "parameters": parameters })
}

/// Starts a workflow when run by hand from the editor.
#[derive(Debug, Clone)]
pub struct ManualTrigger {
    common: Common,
}

common_setters!(ManualTrigger);

impl ManualTrigger {
    pub fn new() -> Self {
        Self {
            common: Common::named("When clicking 'Execute workflow'"),
        }
    }
}

impl Default for ManualTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoNode for ManualTrigger {
    fn into_node(self) -> Result<Node, NodeError> {
        self.common
            .builder("n8n-nodes-base.manualTrigger", TypeVersion::from(1))
            .build()
    }
}

/// Request body of an [`HttpRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum HttpBody {
    /// A JSON document. Strings are sent as-is; anything else is serialized.
    Json(Value),
    /// `application/x-www-form-urlencoded` fields.
    Form(Vec<(String, String)>),
    /// Any other content type with a literal body.
    Raw { content_type: String, body: String },
}

/// Calls an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    common: Common,
    url: String,
    method: String,
    authentication: Option<String>,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Option<HttpBody>,
    response_format: String,
    options: Parameters,
}

common_setters!(HttpRequest);

impl HttpRequest {
    pub fn new(url: &str) -> Self {
        Self {
            common: Common::named("HTTP Request"),
            url: url.to_string(),
            method: "GET".to_string(),
            authentication: None,
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            response_format: "json".to_string(),
            options: Parameters::new(),
        }
    }

    pub fn method(mut self, method: &str) -> Self {
        self.method = method.to_ascii_uppercase();
        self
    }

    /// Credential type, e.g. `headerAuth`. `none` clears it.
    pub fn authentication(mut self, authentication: &str) -> Self {
        self.authentication = (authentication != "none").then(|| authentication.to_string());
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: HttpBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn response_format(mut self, format: &str) -> Self {
        self.response_format = format.to_string();
        self
    }

    pub fn option(mut self, key: &str, value: Value) -> Self {
        self.options.insert(key.to_string(), value);
        self
    }

    fn parameters(self) -> Parameters {
        let mut parameters = Parameters::new();
        parameters.insert("url".to_string(), Value::String(self.url));
        parameters.insert("options".to_string(), Value::Object(self.options));

        // GET is the engine's default and is left out.
        if self.method != "GET" {
            parameters.insert("method".to_string(), Value::String(self.method));
        }
        if let Some(authentication) = self.authentication {
            parameters.insert("authentication".to_string(), Value::String(authentication));
        }
        if !self.headers.is_empty() {
            parameters.insert("headers".to_string(), name_value_list(&self.headers));
        }
        if !self.query.is_empty() {
            parameters.insert("qs".to_string(), name_value_list(&self.query));
        }

        match self.body {
            None => {}
            Some(HttpBody::Json(body)) => {
                parameters.insert("sendBody".to_string(), Value::Bool(true));
                parameters.insert("bodyContentType".to_string(), json!("json"));
                match body {
                    Value::String(text) => {
                        parameters.insert("body".to_string(), Value::String(text));
                    }
                    other => {
                        parameters.insert("jsonParameters".to_string(), Value::Bool(true));
                        parameters.insert("jsonBody".to_string(), Value::String(other.to_string()));
                    }
                }
            }
            Some(HttpBody::Form(fields)) => {
                parameters.insert("sendBody".to_string(), Value::Bool(true));
                parameters.insert("bodyContentType".to_string(), json!("form-urlencoded"));
                parameters.insert("bodyParameters".to_string(), name_value_list(&fields));
            }
            Some(HttpBody::Raw { content_type, body }) => {
                parameters.insert("sendBody".to_string(), Value::Bool(true));
                parameters.insert("bodyContentType".to_string(), Value::String(content_type));
                parameters.insert("body".to_string(), Value::String(body));
            }
        }

        if self.response_format != "json" {
            parameters.insert(
                "responseFormat".to_string(),
                Value::String(self.response_format),
            );
        }
        parameters
    }
}

impl IntoNode for HttpRequest {
    fn into_node(self) -> Result<Node, NodeError> {
        let common = self.common.clone();
        let parameters = self.parameters();
        common
            .builder("n8n-nodes-base.httpRequest", TypeVersion::new(4.2).unwrap_or_default())
            .parameters(parameters)
            .build()
    }
}

/// Reads or writes rows of a Google Sheets document.
#[derive(Debug, Clone)]
pub struct GoogleSheets {
    common: Common,
    operation: String,
    document: Option<Value>,
    sheet: Option<Value>,
    columns: Option<Parameters>,
    options: Parameters,
    credential: Option<(String, String)>,
}

common_setters!(GoogleSheets);

impl GoogleSheets {
    pub fn new(operation: &str) -> Self {
        Self {
            common: Common::named("Google Sheets"),
            operation: operation.to_string(),
            document: None,
            sheet: None,
            columns: None,
            options: Parameters::new(),
            credential: None,
        }
    }

    /// Appends rows, updating the ones whose `matching_columns` already match.
    ///
    /// Columns are mapped explicitly (`mappingMode: defineBelow`) unless
    /// [`GoogleSheets::columns`] says otherwise.
    pub fn append_or_update(matching_columns: &[&str]) -> Self {
        let mut columns = Parameters::new();
        columns.insert("mappingMode".to_string(), json!("defineBelow"));
        if !matching_columns.is_empty() {
            columns.insert("matchingColumns".to_string(), json!(matching_columns));
        }

        let mut sheets = Self::new("appendOrUpdate").name("Append or update row in sheet");
        sheets.columns = Some(columns);
        sheets
    }

    /// Document picked from the list by id.
    pub fn document_id(mut self, id: &str) -> Self {
        self.document = Some(json!({ "__rl": true, "value": id, "mode": "list" }));
        self
    }

    /// Sheet picked from the list by name; the engine resolves the first tab (`gid=0`).
    pub fn sheet_name(mut self, name: &str) -> Self {
        self.sheet = Some(json!({
            "__rl": true,
            "value": "gid=0",
            "mode": "list",
            "cachedResultName": name,
        }));
        self
    }

    /// Raw resource locators, for modes other than `list`.
    pub fn document_locator(mut self, locator: Value) -> Self {
        self.document = Some(locator);
        self
    }

    pub fn sheet_locator(mut self, locator: Value) -> Self {
        self.sheet = Some(locator);
        self
    }

    /// Merges into the column configuration; existing keys are overwritten.
    pub fn columns(mut self, columns: Parameters) -> Self {
        self.columns.get_or_insert_with(Parameters::new).extend(columns);
        self
    }

    pub fn option(mut self, key: &str, value: Value) -> Self {
        self.options.insert(key.to_string(), value);
        self
    }

    /// Google Sheets OAuth2 credential stored in the engine.
    pub fn credential(mut self, id: &str, name: &str) -> Self {
        self.credential = Some((id.to_string(), name.to_string()));
        self
    }
}

impl IntoNode for GoogleSheets {
    fn into_node(self) -> Result<Node, NodeError> {
        let mut parameters = Parameters::new();
        parameters.insert("operation".to_string(), Value::String(self.operation));
        parameters.insert("options".to_string(), Value::Object(self.options));
        if let Some(document) = self.document {
            parameters.insert("documentId".to_string(), document);
        }
        if let Some(sheet) = self.sheet {
            parameters.insert("sheetName".to_string(), sheet);
        }
        if let Some(columns) = self.columns.filter(|c| !c.is_empty()) {
            parameters.insert("columns".to_string(), Value::Object(columns));
        }

        let mut credentials = Parameters::new();
        if let Some((id, name)) = self.credential {
            credentials.insert(
                "googleSheetsOAuth2Api".to_string(),
                json!({ "id": id, "name": name }),
            );
        }

        self.common
            .builder("n8n-nodes-base.googleSheets", TypeVersion::new(4.7).unwrap_or_default())
            .parameters(parameters)
            .credentials(credentials)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_request_omits_method() {
        let node = HttpRequest::new("https://example.com").into_node().unwrap();
        assert_eq!(node.parameter("method"), None);
        assert_eq!(node.parameter("url"), Some(&json!("https://example.com")));
        assert_eq!(node.type_version().to_string(), "4.2");
    }

    #[test]
    fn headers_become_a_name_value_list() {
        let node = HttpRequest::new("https://example.com")
            .method("post")
            .header("Accept", "application/json")
            .into_node()
            .unwrap();
        assert_eq!(node.parameter("method"), Some(&json!("POST")));
        assert_eq!(
            node.parameter("headers"),
            Some(&json!({ "parameters": [{ "name": "Accept", "value": "application/json" }] }))
        );
    }

    #[test]
    fn append_or_update_defaults_mapping_mode() {
        let node = GoogleSheets::append_or_update(&["email"])
            .document_id("doc-1")
            .credential("cred-1", "Sheets account")
            .into_node()
            .unwrap();
        assert_eq!(node.name(), "Append or update row in sheet");
        assert_eq!(
            node.parameter("columns"),
            Some(&json!({ "mappingMode": "defineBelow", "matchingColumns": ["email"] }))
        );
        assert_eq!(
            node.credentials()["googleSheetsOAuth2Api"],
            json!({ "id": "cred-1", "name": "Sheets account" })
        );
    }
}
