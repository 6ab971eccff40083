//! Generation services for Easel
//!
//! Implements the canvas engine's text and image service traits over the
//! OpenAI-compatible HTTP surface, covering a hosted API and the local
//! Ollama / LM Studio runtimes, plus two higher-level services built on
//! the same client: prompt-driven node definition and failure diagnosis.
//!
//! # Architecture
//!
//! ```text
//! ConfigHandle ───► HttpGenerationClient ───► {base}/chat/completions
//!  (snapshot            │         │           {base}/images/generations
//!   per request)        │         │
//!                       │         └─ TextGenerationService +
//!                       │            ImageGenerationService (canvas-engine)
//!                       └─ define_node_from_prompt / suggest_fix
//! ```
//!
//! Chat failures come back inside `TextResponse::error` and image failures
//! as `"Error:"`-prefixed replies; only the definition and diagnosis
//! services return `Result`.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use inference::{ConfigHandle, HttpGenerationClient};
//!
//! let config = ConfigHandle::default();
//! let client = Arc::new(HttpGenerationClient::new(config.clone()));
//! let engine = canvas_engine::CanvasEngine::new(
//!     catalog,
//!     client.clone(),
//!     client.clone(),
//!     events,
//! );
//! ```

pub mod client;
pub mod config;
pub mod definition;
pub mod error;

// Re-export key types
pub use client::HttpGenerationClient;
pub use config::{
    ConfigHandle, ConfigUpdate, EndpointSettings, EndpointUpdate, GenerationConfig,
    HostedSettings, HostedUpdate, LocalEndpoints, RuntimeKind,
};
pub use definition::DYNAMIC_NODE_CATEGORY;
pub use error::{InferenceError, Result};
