//! Tests for the node catalog and the typed node builders.
mod common;
use flowsmith::catalog::NodeCatalogBuilder;
use flowsmith::node::{IdGenerator, SequentialIds, UuidIds};
use flowsmith::prelude::*;
use serde_json::json;

struct SlackKind;

impl NodeKind for SlackKind {
    fn type_name(&self) -> &str {
        "n8n-nodes-base.slack"
    }

    fn type_version(&self) -> TypeVersion {
        TypeVersion::new(2.3).unwrap()
    }

    fn default_name(&self) -> &str {
        "Slack"
    }

    fn default_parameters(&self) -> Parameters {
        let mut parameters = Parameters::new();
        parameters.insert("resource".to_string(), json!("message"));
        parameters
    }
}

#[test]
fn test_default_kinds() {
    let catalog = NodeCatalog::default();
    for short in [
        "manualTrigger",
        "scheduleTrigger",
        "webhook",
        "httpRequest",
        "googleSheets",
        "code",
        "set",
        "if",
        "noOp",
    ] {
        assert!(catalog.is_registered(short), "{} should be registered", short);
        assert!(catalog.is_registered(&format!("n8n-nodes-base.{}", short)));
    }
    assert_eq!(catalog.type_names().len(), 9);
}

#[test]
fn test_create_uses_kind_defaults() {
    let catalog = NodeCatalog::default();
    let node = catalog.create("httpRequest", "Fetch").unwrap();

    assert_eq!(node.node_type(), "n8n-nodes-base.httpRequest");
    assert_eq!(node.name(), "Fetch");
    assert_eq!(node.type_version().to_string(), "4.2");
    assert_eq!(node.parameter("url"), Some(&json!("")));

    let unnamed = catalog.create("manualTrigger", "").unwrap();
    assert_eq!(unnamed.name(), "When clicking 'Execute workflow'");
}

#[test]
fn test_unknown_kind() {
    let err = NodeCatalog::default().create("n8n-nodes-base.teleport", "Beam").unwrap_err();
    assert_eq!(err, NodeError::UnknownKind("n8n-nodes-base.teleport".to_string()));
    assert_eq!(err.code(), ErrorCode::NodeInvalidType);
}

#[test]
fn test_custom_kinds_and_aliases() {
    let catalog = NodeCatalog::builder()
        .with_kind(Box::new(SlackKind))
        .with_type_alias("chat", "n8n-nodes-base.slack")
        .with_type_alias("fetch", "n8n-nodes-base.httpRequest")
        .with_type_alias("broken", "n8n-nodes-base.missing")
        .build();

    let node = catalog.create("chat", "").unwrap();
    assert_eq!(node.node_type(), "n8n-nodes-base.slack");
    assert_eq!(node.name(), "Slack");
    assert_eq!(node.type_version().to_string(), "2.3");
    assert_eq!(node.parameter("resource"), Some(&json!("message")));

    assert_eq!(
        catalog.kind("fetch").unwrap().type_name(),
        "n8n-nodes-base.httpRequest"
    );
    assert!(!catalog.is_registered("broken"));
}

#[test]
fn test_catalog_id_generator() {
    let catalog = NodeCatalogBuilder::new()
        .with_id_generator(Box::new(SequentialIds::new()))
        .build();
    let first = catalog.create("noOp", "Pass Through").unwrap();
    let second = catalog.create("noOp", "Pass Through").unwrap();
    assert_eq!(first.id().as_str(), "pass-through-1");
    assert_eq!(second.id().as_str(), "pass-through-2");

    let uuid = UuidIds.next_id("ignored");
    assert_eq!(uuid.as_str().len(), 36);
}

#[test]
fn test_builders_assemble_the_sample_workflow() {
    let mut workflow = Workflow::new("Users to Google Sheet").unwrap();

    let trigger = workflow
        .add_node(ManualTrigger::new().id("trigger").into_node().unwrap())
        .unwrap();
    let fetch = workflow
        .add_node(
            HttpRequest::new("https://jsonplaceholder.typicode.com/users")
                .name("Fetch users")
                .query("limit", "10")
                .into_node()
                .unwrap(),
        )
        .unwrap();
    let store = workflow
        .add_node(
            GoogleSheets::append_or_update(&["email"])
                .document_id("doc-1")
                .sheet_name("Users")
                .into_node()
                .unwrap(),
        )
        .unwrap();
    workflow.connect(&trigger, &fetch).unwrap();
    workflow.connect(&fetch, &store).unwrap();

    assert!(workflow.validate().is_empty());
    assert!(workflow.warnings().is_empty());

    let fetch = workflow.node(fetch.as_str()).unwrap();
    assert_eq!(
        fetch.parameter("qs"),
        Some(&json!({ "parameters": [{ "name": "limit", "value": "10" }] }))
    );
    assert_eq!(fetch.parameter("method"), None);

    let store = workflow.node(store.as_str()).unwrap();
    assert_eq!(
        store.parameter("sheetName"),
        Some(&json!({
            "__rl": true,
            "value": "gid=0",
            "mode": "list",
            "cachedResultName": "Users"
        }))
    );
    assert!(store.credentials().is_empty());
}

#[test]
fn test_http_bodies() {
    let form = HttpRequest::new("https://example.com/login")
        .method("POST")
        .body(HttpBody::Form(vec![("user".to_string(), "ada".to_string())]))
        .into_node()
        .unwrap();
    assert_eq!(form.parameter("sendBody"), Some(&json!(true)));
    assert_eq!(form.parameter("bodyContentType"), Some(&json!("form-urlencoded")));
    assert_eq!(
        form.parameter("bodyParameters"),
        Some(&json!({ "parameters": [{ "name": "user", "value": "ada" }] }))
    );

    let json_body = HttpRequest::new("https://example.com/items")
        .method("put")
        .authentication("headerAuth")
        .body(HttpBody::Json(json!({ "id": 1 })))
        .response_format("text")
        .into_node()
        .unwrap();
    assert_eq!(json_body.parameter("method"), Some(&json!("PUT")));
    assert_eq!(json_body.parameter("authentication"), Some(&json!("headerAuth")));
    assert_eq!(json_body.parameter("jsonParameters"), Some(&json!(true)));
    assert_eq!(json_body.parameter("jsonBody"), Some(&json!(r#"{"id":1}"#)));
    assert_eq!(json_body.parameter("responseFormat"), Some(&json!("text")));

    let raw = HttpRequest::new("https://example.com/upload")
        .method("POST")
        .body(HttpBody::Raw {
            content_type: "raw".to_string(),
            body: "hello".to_string(),
        })
        .into_node()
        .unwrap();
    assert_eq!(raw.parameter("bodyContentType"), Some(&json!("raw")));
    assert_eq!(raw.parameter("body"), Some(&json!("hello")));
}

#[test]
fn test_sheets_columns_override_defaults() {
    let mut columns = Parameters::new();
    columns.insert("mappingMode".to_string(), json!("autoMapInputData"));

    let node = GoogleSheets::append_or_update(&[])
        .columns(columns)
        .document_locator(json!({ "__rl": true, "value": "https://docs.google.com/x", "mode": "url" }))
        .into_node()
        .unwrap();

    assert_eq!(
        node.parameter("columns"),
        Some(&json!({ "mappingMode": "autoMapInputData" }))
    );
    assert_eq!(node.parameter("documentId").unwrap()["mode"], json!("url"));
    assert_eq!(node.parameter("operation"), Some(&json!("appendOrUpdate")));
}

#[test]
fn test_plain_nodes_convert_too() {
    let node = common::noop("plain").into_node().unwrap();
    assert_eq!(node.id().as_str(), "plain");

    let built = Node::builder("n8n-nodes-base.set", "Fields")
        .id("fields")
        .into_node()
        .unwrap();
    assert_eq!(built.name(), "Fields");
}
