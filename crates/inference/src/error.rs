//! Inference-side error type
//!
//! Calls that feed node execution report failures inside their responses
//! (`TextResponse::error`, the `"Error:"` image reply convention), so this
//! type only covers the operations with a real failure channel: node
//! definition and fix suggestions.

use thiserror::Error;

/// Errors from the definition and diagnosis services
///
/// Messages are composed close to where the failure happens and already
/// name the runtime involved, so the variants pass them through verbatim.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The chat request failed before producing usable text.
    #[error("{0}")]
    Generation(String),

    /// The model replied, but not with a usable node definition.
    #[error("{0}")]
    InvalidDefinition(String),
}

/// Convenience alias for inference results
pub type Result<T> = std::result::Result<T, InferenceError>;
