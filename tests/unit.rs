//! Unit tests for value types and error reporting.
mod common;
use flowsmith::prelude::*;
use std::path::PathBuf;

#[test]
fn test_error_codes_are_stable() {
    let codes = [
        (ErrorCode::WorkflowInvalidName, "WF001"),
        (ErrorCode::WorkflowNoNodes, "WF002"),
        (ErrorCode::WorkflowDuplicateNode, "WF003"),
        (ErrorCode::WorkflowValidationFailed, "WF004"),
        (ErrorCode::NodeInvalidType, "ND001"),
        (ErrorCode::NodeInvalidParameters, "ND002"),
        (ErrorCode::NodeMissingRequiredField, "ND003"),
        (ErrorCode::NodeValidationFailed, "ND004"),
        (ErrorCode::ConnectionSourceNotFound, "CN001"),
        (ErrorCode::ConnectionTargetNotFound, "CN002"),
        (ErrorCode::ConnectionInvalidOutput, "CN003"),
        (ErrorCode::ConnectionCircularDependency, "CN004"),
        (ErrorCode::ExportFileError, "EX001"),
        (ErrorCode::ExportSerializationError, "EX002"),
        (ErrorCode::ExportValidationError, "EX003"),
        (ErrorCode::ImportFileNotFound, "IM001"),
        (ErrorCode::ImportInvalidJson, "IM002"),
        (ErrorCode::ImportMissingFields, "IM003"),
        (ErrorCode::ImportUnsupportedVersion, "IM004"),
    ];
    for (code, expected) in codes {
        assert_eq!(code.as_str(), expected);
        assert_eq!(code.to_string(), expected);
    }
}

#[test]
fn test_error_messages() {
    assert_eq!(
        WorkflowError::InvalidName.to_string(),
        "Workflow name cannot be empty"
    );
    assert_eq!(
        WorkflowError::DuplicateNode { id: "a".to_string() }.to_string(),
        "Node with ID 'a' already exists in workflow"
    );
    assert_eq!(
        ConnectionError::SourceNotFound("x".to_string()).to_string(),
        "Source node 'x' is not in the workflow"
    );
    assert_eq!(
        ImportError::FileNotFound(PathBuf::from("missing.json")).to_string(),
        "Workflow file not found: missing.json"
    );
    assert_eq!(
        ImportError::MissingField("nodes".to_string()).to_string(),
        "Missing required key 'nodes' in workflow document"
    );
}

#[test]
fn test_errors_box_into_prelude_result() {
    fn build() -> Result<Workflow> {
        let mut workflow = Workflow::new("Boxed")?;
        workflow.add_node(Node::new("n8n-nodes-base.noOp", "Only")?)?;
        workflow.connect("only-x", "only-y")?;
        Ok(workflow)
    }

    let err = build().unwrap_err();
    assert!(err.downcast_ref::<ConnectionError>().is_some());
}

#[test]
fn test_type_version_forms() {
    assert_eq!(TypeVersion::default().to_string(), "1");
    assert_eq!(TypeVersion::new(2.0).unwrap().to_string(), "2");
    assert_eq!(TypeVersion::new(4.2).unwrap().to_string(), "4.2");
    assert_eq!(TypeVersion::from(3).as_f64(), 3.0);
    assert!(TypeVersion::new(0.0).is_none());
    assert!(TypeVersion::new(-1.5).is_none());
    assert!(TypeVersion::new(f64::NAN).is_none());
}

#[test]
fn test_type_version_keeps_whole_values_beyond_i64() {
    let huge = TypeVersion::new(1e20).unwrap();
    assert_eq!(huge.as_f64(), 1e20);

    let edge = TypeVersion::new(i64::MAX as f64).unwrap();
    assert_eq!(edge.as_f64(), 9_223_372_036_854_775_808.0);

    let largest_whole = TypeVersion::new(9_007_199_254_740_992.0).unwrap();
    assert_eq!(largest_whole.to_string(), "9007199254740992");
}

#[test]
fn test_set_parameter_rejects_unrepresentable_values() {
    use std::collections::HashMap;

    let mut node = common::noop("params");
    let mut by_tuple = HashMap::new();
    by_tuple.insert((1, 2), "tuple keys are not JSON object keys");

    let err = node.set_parameter("lookup", by_tuple).unwrap_err();
    assert!(matches!(err, NodeError::InvalidParameters { ref key, .. } if key == "lookup"));
    assert_eq!(err.code(), ErrorCode::NodeInvalidParameters);
    assert!(node.parameter("lookup").is_none());

    node.set_parameter("nested", serde_json::json!({ "a": [1, 2, { "b": null }] }))
        .unwrap();
    assert!(node.parameter("nested").is_some());
}

#[test]
fn test_node_equality_is_by_id() {
    let a = common::node("same", "First", "n8n-nodes-base.noOp");
    let b = common::node("same", "Second", "n8n-nodes-base.set");
    let c = common::node("other", "First", "n8n-nodes-base.noOp");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.to_string(), "First (n8n-nodes-base.noOp, same)");
}

#[test]
fn test_port_display() {
    assert_eq!(Port::default().to_string(), "main[0]");
    assert_eq!(Port::new("ai_tool", 2).to_string(), "ai_tool[2]");
}
