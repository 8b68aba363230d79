//! Common test utilities for building nodes and workflows.
use flowsmith::prelude::*;
use serde_json::json;

/// A node of `node_type` with a fixed id, so documents are reproducible.
#[allow(dead_code)]
pub fn node(id: &str, name: &str, node_type: &str) -> Node {
    Node::builder(node_type, name)
        .id(id)
        .build()
        .expect("fixture node should build")
}

/// A no-op node whose id and name are both `name`.
#[allow(dead_code)]
pub fn noop(name: &str) -> Node {
    node(name, name, "n8n-nodes-base.noOp")
}

/// Workflow "Pipeline": trigger `T` -> fetch `F` -> sink `S`.
#[allow(dead_code)]
pub fn create_pipeline() -> Workflow {
    let mut workflow = Workflow::with_id("Pipeline", "wf-pipeline").expect("valid name");
    workflow
        .add_nodes([
            node("t", "T", "n8n-nodes-base.manualTrigger"),
            Node::builder("n8n-nodes-base.httpRequest", "F")
                .id("f")
                .type_version(TypeVersion::new(4.2).expect("valid version"))
                .parameter("url", json!("https://example.com/users"))
                .parameter("options", json!({}))
                .build()
                .expect("fixture node should build"),
            node("s", "S", "n8n-nodes-base.noOp"),
        ])
        .expect("unique ids");
    workflow.connect("t", "f").expect("members");
    workflow.connect("f", "s").expect("members");
    workflow
}

/// Nodes `A`, `B`, `C` connected `A -> B -> C -> A`.
#[allow(dead_code)]
pub fn create_cycle() -> Workflow {
    let mut workflow = Workflow::new("Cycle").expect("valid name");
    workflow
        .add_nodes([noop("A"), noop("B"), noop("C")])
        .expect("unique ids");
    workflow.connect("A", "B").expect("members");
    workflow.connect("B", "C").expect("members");
    workflow.connect("C", "A").expect("members");
    workflow
}

/// A workflow touching every part of the document: fan-out, a gap in the output slots,
/// a non-main port, credentials, fractional versions and metadata.
#[allow(dead_code)]
pub fn create_rich_workflow() -> Workflow {
    let mut workflow = Workflow::with_id("Rich", "wf-rich").expect("valid name");
    workflow.set_active(false);
    workflow.add_tag("imported");
    workflow
        .settings_mut()
        .insert("executionOrder".to_string(), json!("v1"));

    let sheets = GoogleSheets::append_or_update(&["email"])
        .id("sheets")
        .document_id("doc-1")
        .sheet_name("Users")
        .credential("cred-1", "Sheets account")
        .position([660, 0])
        .into_node()
        .expect("builder output is valid");

    workflow
        .add_nodes([
            node("trigger", "Start", "n8n-nodes-base.manualTrigger"),
            node("check", "Check", "n8n-nodes-base.if"),
            sheets,
            node("skip", "Skip", "n8n-nodes-base.noOp"),
            node("tool", "Tool", "@n8n/n8n-nodes-langchain.toolCode"),
        ])
        .expect("unique ids");

    workflow.connect("trigger", "check").expect("members");
    workflow
        .connect_ports("check", "sheets", Port::main(0), Port::main(0))
        .expect("members");
    workflow
        .connect_ports("check", "skip", Port::main(2), Port::main(0))
        .expect("members");
    workflow
        .connect_ports("check", "sheets", Port::main(2), Port::main(0))
        .expect("members");
    workflow
        .connect_ports("tool", "check", Port::new("ai_tool", 0), Port::new("ai_tool", 0))
        .expect("members");
    workflow
}
