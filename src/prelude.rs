//! Prelude module for convenient imports
//!
//! Re-exports the types needed to build, validate, export and import a workflow.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowsmith::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let workflow = Workflow::import("path/to/workflow.json")?;
//! for problem in workflow.validate() {
//!     println!("error: {}", problem);
//! }
//! for warning in workflow.warnings() {
//!     println!("warning: {}", warning);
//! }
//! workflow.export_with("path/to/copy.json", &ExportOptions::default().with_pretty(false))?;
//! # Ok(())
//! # }
//! ```

// Graph model
pub use crate::node::{Node, NodeBuilder, NodeId, Parameters, Position, TypeVersion};
pub use crate::workflow::{
    Connection, LayoutOptions, MAX_PORT_INDEX, Port, Workflow, WorkflowState,
};

// Node kinds and typed builders
pub use crate::catalog::{
    GoogleSheets, HttpBody, HttpRequest, IntoNode, ManualTrigger, NodeCatalog, NodeKind,
};

// Serialization
pub use crate::codec::ExportOptions;

// Error types
pub use crate::error::{
    ConnectionError, ErrorCode, ExportError, ImportError, NodeError, ValidationError,
    WorkflowError,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
