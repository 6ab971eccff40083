//! Generation service traits
//!
//! The execution engine talks to language and image models through these
//! traits only. Concrete clients (hosted APIs, local OpenAI-compatible
//! runtimes) live in a separate crate; tests substitute canned
//! implementations.
//!
//! Service calls never fail at the type level: failures come back inside
//! the response so a node can record them as its own error state and the
//! canvas keeps running.

use async_trait::async_trait;

/// Outcome of a text generation call
#[derive(Debug, Clone, PartialEq)]
pub struct TextResponse {
    /// Generated text (empty when `error` is set)
    pub text: String,
    /// Service-level failure, reported on the node instead of thrown
    pub error: Option<String>,
}

impl TextResponse {
    /// A successful response
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: None,
        }
    }

    /// A failed response
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            error: Some(message.into()),
        }
    }
}

/// Text generation backend
#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Generate text for a prompt. `web_augmentation` asks the backend to
    /// ground the response with web results where it supports that.
    async fn generate_text(&self, prompt: &str, web_augmentation: bool) -> TextResponse;
}

/// Image generation backend
#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Generate an image for a prompt, returning a data URI.
    ///
    /// `model_identifier` selects a specific local model when present.
    /// A reply starting with `"Error:"` is the failure channel; callers
    /// treat it as an execution error rather than an image.
    async fn generate_image(&self, prompt: &str, model_identifier: Option<&str>) -> String;
}
