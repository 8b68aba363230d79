use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Stable, machine-readable error codes shared by every error family.
///
/// The string form (`WF001`, `CN004`, ...) is part of the public contract and
/// never changes between releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    WorkflowInvalidName,
    WorkflowNoNodes,
    WorkflowDuplicateNode,
    WorkflowValidationFailed,

    NodeInvalidType,
    NodeInvalidParameters,
    NodeMissingRequiredField,
    NodeValidationFailed,

    ConnectionSourceNotFound,
    ConnectionTargetNotFound,
    ConnectionInvalidOutput,
    ConnectionCircularDependency,

    ExportFileError,
    ExportSerializationError,
    ExportValidationError,

    ImportFileNotFound,
    ImportInvalidJson,
    ImportMissingFields,
    ImportUnsupportedVersion,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::WorkflowInvalidName => "WF001",
            ErrorCode::WorkflowNoNodes => "WF002",
            ErrorCode::WorkflowDuplicateNode => "WF003",
            ErrorCode::WorkflowValidationFailed => "WF004",
            ErrorCode::NodeInvalidType => "ND001",
            ErrorCode::NodeInvalidParameters => "ND002",
            ErrorCode::NodeMissingRequiredField => "ND003",
            ErrorCode::NodeValidationFailed => "ND004",
            ErrorCode::ConnectionSourceNotFound => "CN001",
            ErrorCode::ConnectionTargetNotFound => "CN002",
            ErrorCode::ConnectionInvalidOutput => "CN003",
            ErrorCode::ConnectionCircularDependency => "CN004",
            ErrorCode::ExportFileError => "EX001",
            ErrorCode::ExportSerializationError => "EX002",
            ErrorCode::ExportValidationError => "EX003",
            ErrorCode::ImportFileNotFound => "IM001",
            ErrorCode::ImportInvalidJson => "IM002",
            ErrorCode::ImportMissingFields => "IM003",
            ErrorCode::ImportUnsupportedVersion => "IM004",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while creating or mutating a `Workflow`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("Workflow name cannot be empty")]
    InvalidName,

    #[error("Node with ID '{id}' already exists in workflow")]
    DuplicateNode { id: String },
}

impl WorkflowError {
    pub fn code(&self) -> ErrorCode {
        match self {
            WorkflowError::InvalidName => ErrorCode::WorkflowInvalidName,
            WorkflowError::DuplicateNode { .. } => ErrorCode::WorkflowDuplicateNode,
        }
    }
}

/// Errors raised while constructing a `Node` or setting its parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("Node type '{type_name}' is invalid: {reason}")]
    InvalidType { type_name: String, reason: String },

    #[error("Node kind '{0}' is not registered in the catalog")]
    UnknownKind(String),

    #[error("Node field '{0}' cannot be empty")]
    MissingField(&'static str),

    #[error("Parameter '{key}' cannot be represented as JSON: {message}")]
    InvalidParameters { key: String, message: String },
}

impl NodeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            NodeError::InvalidType { .. } | NodeError::UnknownKind(_) => ErrorCode::NodeInvalidType,
            NodeError::MissingField(_) => ErrorCode::NodeMissingRequiredField,
            NodeError::InvalidParameters { .. } => ErrorCode::NodeInvalidParameters,
        }
    }
}

/// Errors raised by `Workflow::connect` and friends.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectionError {
    #[error("Source node '{0}' is not in the workflow")]
    SourceNotFound(String),

    #[error("Target node '{0}' is not in the workflow")]
    TargetNotFound(String),

    #[error("Port kind cannot be empty (on the {side} side of '{node_id}')")]
    InvalidPort { node_id: String, side: &'static str },
}

impl ConnectionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConnectionError::SourceNotFound(_) => ErrorCode::ConnectionSourceNotFound,
            ConnectionError::TargetNotFound(_) => ErrorCode::ConnectionTargetNotFound,
            ConnectionError::InvalidPort { .. } => ErrorCode::ConnectionInvalidOutput,
        }
    }
}

/// Aggregated structural findings, raised only when an export is asked to validate.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Workflow validation failed: {}", messages.join(", "))]
pub struct ValidationError {
    messages: Vec<String>,
}

impl ValidationError {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// Every finding reported by `Workflow::validate`, in check order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn code(&self) -> ErrorCode {
        ErrorCode::WorkflowValidationFailed
    }
}

/// Errors that can occur while writing a workflow document.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to export workflow to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Connection references node '{0}', which is not in the workflow")]
    UnresolvedNode(String),
}

impl ExportError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ExportError::Validation(_) => ErrorCode::ExportValidationError,
            ExportError::Io { .. } => ErrorCode::ExportFileError,
            ExportError::Serialization(_) | ExportError::UnresolvedNode(_) => {
                ErrorCode::ExportSerializationError
            }
        }
    }
}

/// Errors that can occur while reading a workflow document.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Workflow file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Error reading file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid workflow path {}: {reason}", path.display())]
    InvalidPath { path: PathBuf, reason: &'static str },

    #[error("Invalid JSON in workflow document: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Missing required key '{0}' in workflow document")]
    MissingField(String),

    #[error("Malformed value at '{path}': {message}")]
    Malformed { path: String, message: String },

    #[error("Node '{node}' declares unsupported typeVersion {found}")]
    UnsupportedVersion { node: String, found: String },
}

impl ImportError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ImportError::FileNotFound(_)
            | ImportError::InvalidPath { .. }
            | ImportError::Io { .. } => ErrorCode::ImportFileNotFound,
            ImportError::InvalidJson(_) => ErrorCode::ImportInvalidJson,
            ImportError::MissingField(_) | ImportError::Malformed { .. } => {
                ErrorCode::ImportMissingFields
            }
            ImportError::UnsupportedVersion { .. } => ErrorCode::ImportUnsupportedVersion,
        }
    }

    pub(crate) fn malformed(path: impl Into<String>, message: impl fmt::Display) -> Self {
        ImportError::Malformed {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
