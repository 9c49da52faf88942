//! Error types for the core domain model.

use thiserror::Error;

use crate::NodeId;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Structural defects in a graph returned by the model service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphValidationError {
    /// Two nodes share the same identifier.
    #[error("duplicate node id `{id}`")]
    DuplicateNodeId { id: NodeId },

    /// A node has an empty or whitespace-only identifier.
    #[error("node at position {index} has an empty id")]
    EmptyNodeId { index: usize },

    /// An edge names a node that is not in the graph.
    #[error("edge {index} references unknown node `{missing}`")]
    DanglingEdge { index: usize, missing: NodeId },
}

/// Errors raised while building core values.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Uploaded file is not text.
    #[error("file `{name}` looks like binary data ({format})")]
    BinaryUpload { name: String, format: String },

    /// Uploaded file is not valid UTF-8.
    #[error("file `{name}` is not valid UTF-8 text")]
    InvalidEncoding { name: String },

    /// Uploaded file has an empty name.
    #[error("uploaded file name must not be empty")]
    EmptyFileName,

    /// Uploaded file exceeds the configured size limit.
    #[error("file `{name}` is {size}, which exceeds the {limit} upload limit")]
    UploadTooLarge {
        name: String,
        size: String,
        limit: String,
    },
}
