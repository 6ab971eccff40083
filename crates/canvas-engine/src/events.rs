//! Event types for streaming canvas and execution progress
//!
//! Events are sent from the engine to the frontend (or any consumer)
//! to report structural changes, execution progress, and lock ownership.

use serde::{Deserialize, Serialize};

/// Trait for delivering canvas events to a consumer
///
/// Implementations decide the transport (IPC channel, mpsc, in-memory
/// buffer); the engine only sees this seam.
pub trait EventSink: Send + Sync {
    /// Deliver one event
    ///
    /// Fails when the underlying transport is gone (e.g., receiver dropped)
    fn send(&self, event: CanvasEvent) -> Result<(), EventError>;
}

/// Error when delivering an event fails
#[derive(Debug, Clone)]
pub struct EventError {
    pub message: String,
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event error: {}", self.message)
    }
}

impl std::error::Error for EventError {}

/// Events emitted by the canvas engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CanvasEvent {
    /// A node was placed on the canvas
    #[serde(rename_all = "camelCase")]
    NodeAdded { node_id: String, type_name: String },

    /// A node and its attached edges were removed
    #[serde(rename_all = "camelCase")]
    NodeRemoved { node_id: String },

    /// An edge was created, possibly replacing a previous edge into the
    /// same input
    #[serde(rename_all = "camelCase")]
    EdgeAdded {
        edge_id: String,
        replaced_edge_id: Option<String>,
    },

    /// A connection attempt was refused
    #[serde(rename_all = "camelCase")]
    EdgeRejected { reason: String },

    /// A node began executing
    #[serde(rename_all = "camelCase")]
    NodeStarted { node_id: String },

    /// A node finished executing successfully, outputs committed
    #[serde(rename_all = "camelCase")]
    NodeSucceeded { node_id: String },

    /// A node finished executing with an error
    #[serde(rename_all = "camelCase")]
    NodeFailed { node_id: String, error: String },

    /// A node took the exclusive interaction lock
    #[serde(rename_all = "camelCase")]
    LockAcquired { node_id: String },

    /// The exclusive interaction lock was released
    #[serde(rename_all = "camelCase")]
    LockReleased { node_id: String },

    /// A full-canvas run started
    #[serde(rename_all = "camelCase")]
    WorkflowStarted { node_count: usize },

    /// A full-canvas run finished (failed nodes included, the run never
    /// aborts early)
    #[serde(rename_all = "camelCase")]
    WorkflowCompleted,
}

impl CanvasEvent {
    /// Create a node started event
    pub fn node_started(node_id: &str) -> Self {
        Self::NodeStarted {
            node_id: node_id.to_string(),
        }
    }

    /// Create a node failed event
    pub fn node_failed(node_id: &str, error: impl Into<String>) -> Self {
        Self::NodeFailed {
            node_id: node_id.to_string(),
            error: error.into(),
        }
    }
}

/// Sink that drops every event on the floor
///
/// For callers that don't observe progress (batch runs, tests).
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: CanvasEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// Sink that buffers events in memory
///
/// Tests assert on the buffer to check what the engine reported.
pub struct VecEventSink {
    events: std::sync::Mutex<Vec<CanvasEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything received so far
    pub fn events(&self) -> Vec<CanvasEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Discard the buffer
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Default for VecEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: CanvasEvent) -> Result<(), EventError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}
