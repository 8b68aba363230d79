use crate::error::NodeError;
use crate::node::{IdGenerator, Node, Parameters, TypeVersion};
use ahash::AHashMap;
use serde_json::{Value, json};

mod builders;

pub use builders::{GoogleSheets, HttpBody, HttpRequest, IntoNode, ManualTrigger};

/// Describes one kind of node the execution engine understands.
pub trait NodeKind: Send + Sync {
    /// Fully qualified type tag, e.g. `n8n-nodes-base.httpRequest`.
    fn type_name(&self) -> &str;
    fn type_version(&self) -> TypeVersion;
    /// Display name used when a node of this kind is created without one.
    fn default_name(&self) -> &str;
    fn default_parameters(&self) -> Parameters {
        Parameters::new()
    }
}

fn object(value: Value) -> Parameters {
    match value {
        Value::Object(map) => map,
        _ => Parameters::new(),
    }
}

/// Defines the built-in node kinds and the function registering them.
macro_rules! define_node_kinds {
    ( $( ($struct_name:ident, $type_name:expr, $version:expr, $default_name:expr, $parameters:tt) ),* $(,)? ) => {
        $(
            struct $struct_name;
            impl NodeKind for $struct_name {
                fn type_name(&self) -> &str { $type_name }
                fn type_version(&self) -> TypeVersion { TypeVersion::new($version).unwrap_or_default() }
                fn default_name(&self) -> &str { $default_name }
                fn default_parameters(&self) -> Parameters { object(json!($parameters)) }
            }
        )*

        /// Registers every built-in kind under its type tag, plus its short name as an alias.
        fn register_default_kinds(
            kinds: &mut AHashMap<String, Box<dyn NodeKind>>,
            aliases: &mut AHashMap<String, String>,
        ) {
            $(
                kinds.insert($type_name.to_string(), Box::new($struct_name));
                if let Some((_, short)) = $type_name.rsplit_once('.') {
                    aliases.insert(short.to_string(), $type_name.to_string());
                }
            )*
        }
    };
}

define_node_kinds! {
    // Triggers
    (ManualTriggerKind, "n8n-nodes-base.manualTrigger", 1.0, "When clicking 'Execute workflow'", {}),
    (ScheduleTriggerKind, "n8n-nodes-base.scheduleTrigger", 1.2, "Schedule Trigger", { "rule": { "interval": [{}] } }),
    (WebhookKind, "n8n-nodes-base.webhook", 2.0, "Webhook", { "httpMethod": "GET", "path": "", "options": {} }),

    // Integrations
    (HttpRequestKind, "n8n-nodes-base.httpRequest", 4.2, "HTTP Request", { "url": "", "options": {} }),
    (GoogleSheetsKind, "n8n-nodes-base.googleSheets", 4.7, "Google Sheets", { "operation": "appendOrUpdate", "options": {} }),

    // Core
    (CodeKind, "n8n-nodes-base.code", 2.0, "Code", { "jsCode": "return $input.all();" }),
    (SetKind, "n8n-nodes-base.set", 3.4, "Edit Fields", { "options": {} }),
    (IfKind, "n8n-nodes-base.if", 2.0, "If", { "conditions": {}, "options": {} }),
    (NoOpKind, "n8n-nodes-base.noOp", 1.0, "No Operation, do nothing", {}),
}

/// Registry of node kinds, resolving type tags and aliases to ready-made nodes.
pub struct NodeCatalog {
    kinds: AHashMap<String, Box<dyn NodeKind>>,
    aliases: AHashMap<String, String>,
    ids: Option<Box<dyn IdGenerator>>,
}

pub struct NodeCatalogBuilder {
    kinds: AHashMap<String, Box<dyn NodeKind>>,
    aliases: AHashMap<String, String>,
    ids: Option<Box<dyn IdGenerator>>,
}

impl NodeCatalogBuilder {
    pub fn new() -> Self {
        let mut kinds: AHashMap<String, Box<dyn NodeKind>> = AHashMap::new();
        let mut aliases = AHashMap::new();
        register_default_kinds(&mut kinds, &mut aliases);
        Self {
            kinds,
            aliases,
            ids: None,
        }
    }

    /// Registers a kind, replacing any kind already registered under the same type tag.
    pub fn with_kind(mut self, kind: Box<dyn NodeKind>) -> Self {
        self.kinds.insert(kind.type_name().to_string(), kind);
        self
    }

    /// Makes `alias` resolve to `type_name`. Ignored if `type_name` is not registered.
    pub fn with_type_alias(mut self, alias: &str, type_name: &str) -> Self {
        if self.kinds.contains_key(type_name) {
            self.aliases
                .insert(alias.to_string(), type_name.to_string());
        } else {
            tracing::warn!("ignoring alias '{}': unknown node type '{}'", alias, type_name);
        }
        self
    }

    /// Id strategy for created nodes; the process-wide sequential ids when unset.
    pub fn with_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn build(self) -> NodeCatalog {
        NodeCatalog {
            kinds: self.kinds,
            aliases: self.aliases,
            ids: self.ids,
        }
    }
}

impl Default for NodeCatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeCatalog {
    pub fn builder() -> NodeCatalogBuilder {
        NodeCatalogBuilder::new()
    }

    /// Looks up a kind by type tag first, then by alias.
    pub fn kind(&self, type_or_alias: &str) -> Option<&dyn NodeKind> {
        let type_name = self
            .aliases
            .get(type_or_alias)
            .filter(|_| !self.kinds.contains_key(type_or_alias))
            .map_or(type_or_alias, String::as_str);
        self.kinds.get(type_name).map(|kind| &**kind)
    }

    pub fn is_registered(&self, type_or_alias: &str) -> bool {
        self.kind(type_or_alias).is_some()
    }

    /// Registered type tags, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Creates a node of a registered kind with its version and default parameters.
    ///
    /// A blank `name` falls back to the kind's default name.
    pub fn create(&self, type_or_alias: &str, name: &str) -> Result<Node, NodeError> {
        let kind = self
            .kind(type_or_alias)
            .ok_or_else(|| NodeError::UnknownKind(type_or_alias.to_string()))?;

        let name = if name.trim().is_empty() {
            kind.default_name()
        } else {
            name
        };
        let builder = Node::builder(kind.type_name(), name)
            .type_version(kind.type_version())
            .parameters(kind.default_parameters());

        match &self.ids {
            Some(ids) => builder.build_with(ids.as_ref()),
            None => builder.build(),
        }
    }
}

impl Default for NodeCatalog {
    fn default() -> Self {
        NodeCatalogBuilder::new().build()
    }
}
