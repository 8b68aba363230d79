//! # Flowsmith - Workflow Graph Builder for n8n-compatible Engines
//!
//! **Flowsmith** builds automation workflows as typed, in-memory graphs, checks their
//! structure, and reads and writes them in the JSON document format an n8n-compatible
//! execution engine imports. It does not execute workflows.
//!
//! ## Core Workflow
//!
//! 1.  **Create Nodes**: Use `Node::new`, `Node::builder`, a typed builder from
//!     [`catalog`] (`HttpRequest`, `GoogleSheets`, ...) or a `NodeCatalog`.
//! 2.  **Assemble**: Add nodes to a `Workflow` and `connect` them. Nodes without a position
//!     are placed on a grid.
//! 3.  **Validate**: `Workflow::validate` lists every structural problem (no nodes,
//!     dangling connections, cycles, duplicate names) without failing.
//! 4.  **Export / Import**: `Workflow::export` validates and writes the document;
//!     `Workflow::import` reads one back. Export, import, export yields identical bytes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowsmith::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut workflow = Workflow::new("Users to Google Sheet")?;
//!
//!     let trigger = workflow.add_node(ManualTrigger::new().into_node()?)?;
//!     let fetch = workflow.add_node(
//!         HttpRequest::new("https://jsonplaceholder.typicode.com/users")
//!             .name("Fetch users")
//!             .into_node()?,
//!     )?;
//!     let store = workflow.add_node(
//!         GoogleSheets::append_or_update(&["email"])
//!             .document_id("1AbC")
//!             .sheet_name("Users")
//!             .into_node()?,
//!     )?;
//!
//!     workflow.connect(&trigger, &fetch)?;
//!     workflow.connect(&fetch, &store)?;
//!
//!     for problem in workflow.validate() {
//!         eprintln!("{}", problem);
//!     }
//!     workflow.export("out/users.json")?;
//!
//!     let reloaded = Workflow::import("out/users.json")?;
//!     assert_eq!(reloaded.nodes().len(), 3);
//!     Ok(())
//! }
//! ```
//!
//! The library logs through `tracing` and never installs a subscriber; that is left to the
//! application.

pub mod catalog;
pub mod codec;
pub mod error;
pub mod node;
pub mod prelude;
pub mod workflow;
