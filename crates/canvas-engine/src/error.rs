//! Error types for the canvas engine

use thiserror::Error;

/// Result type alias using CanvasError
pub type Result<T> = std::result::Result<T, CanvasError>;

/// Errors that can occur in the canvas engine
///
/// Note that node execution failures are not errors at this level: they are
/// recorded on the node itself as an `error` status and message, and the
/// engine keeps going. These variants cover structural misuse of the API.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Referenced node does not exist
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Referenced edge does not exist
    #[error("Edge not found: {0}")]
    EdgeNotFound(String),

    /// Referenced port does not exist on the node
    #[error("Port '{port}' not found on node '{node}'")]
    PortNotFound { node: String, port: String },

    /// Connection endpoints have incompatible data kinds
    #[error("Incompatible connection: {source_kind} output cannot feed {target_kind} input")]
    IncompatibleKinds {
        source_kind: String,
        target_kind: String,
    },

    /// Catalog has no definition under the requested type name
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// A document failed structural validation and cannot be loaded
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The operation is refused while a drawing tool holds the canvas
    #[error("Canvas is locked by an active drawing tool")]
    DrawingLocked,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
