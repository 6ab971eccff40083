//! Canvas Engine - node-based visual workflow core for Easel
//!
//! This crate is the headless heart of the canvas: everything a host shell
//! needs to present an infinite pannable canvas of connected, executable
//! nodes, with no rendering of its own. It provides:
//!
//! - World/viewport geometry with bounded cursor-anchored zoom
//! - A pointer gesture state machine (pan, drag, resize, wire)
//! - An exclusive drawing lock for in-node sketch surfaces
//! - A flat node/edge document store with validated connections
//! - Strategy-based node execution with downstream value propagation
//! - A catalog of node definitions, extensible at runtime
//!
//! # Architecture
//!
//! [`CanvasEngine`] owns all mutable state behind a single async lock and
//! is the only type hosts talk to. Node behavior is dispatched over
//! [`NodeKind`]: built-in kinds run fixed strategies, templated kinds fill
//! a prompt template and call a [`TextGenerationService`]. Generation
//! backends are trait objects, so the engine never couples to a concrete
//! runtime.
//!
//! # Example
//!
//! ```ignore
//! use canvas_engine::{CanvasEngine, NodeCatalog, NullEventSink};
//! use std::sync::Arc;
//!
//! let engine = CanvasEngine::new(
//!     NodeCatalog::with_builtins(),
//!     text_service,
//!     image_service,
//!     Arc::new(NullEventSink),
//! );
//! let id = engine.add_node("Text Input", 100.0, 80.0).await?;
//! engine.execute_node(&id).await;
//! ```

pub mod builder;
pub mod capability;
pub mod catalog;
pub mod definition;
pub mod engine;
pub mod error;
pub mod events;
pub mod geometry;
pub mod gestures;
pub mod lock;
pub mod services;
pub mod store;
pub mod strategies;
pub mod types;
pub mod validation;

// Re-export key types
pub use builder::DocumentBuilder;
pub use catalog::{instantiate_definition, NodeCatalog};
pub use definition::{DefinitionFn, NodeDefinition, PortSpec};
pub use engine::CanvasEngine;
pub use error::{CanvasError, Result};
pub use events::{CanvasEvent, EventSink, NullEventSink, VecEventSink};
pub use gestures::{GestureController, GestureState, PointerButton, PointerTarget};
pub use lock::DrawLock;
pub use services::{ImageGenerationService, TextGenerationService, TextResponse};
pub use store::{CanvasStore, ConnectOutcome};
pub use types::{
    BuiltInKind, CanvasDocument, DataKind, Edge, NodeData, NodeId, NodeKind, NodeStatus, Point,
    Port, PortRole, TemplateSpec, ViewTransform,
};
pub use validation::{validate_document, ValidationIssue};
