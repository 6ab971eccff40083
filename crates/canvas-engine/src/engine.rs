//! Canvas engine facade
//!
//! Ties the document store, view transform, gesture state machine, drawing
//! lock and node catalog together behind one shared, async surface. Hosts
//! feed pointer input and invoke operations; the engine mutates state,
//! emits [`CanvasEvent`]s, and runs node strategies.
//!
//! # Execution model
//!
//! Executing a node writes `running` status with a `"..."` timing
//! placeholder, runs the kind's strategy, then commits outputs (or the
//! error message) together with the measured duration. A successful node
//! propagates its output values across outgoing edges; auto-reactive
//! targets are queued and drained FIFO after the triggering execution
//! returns, so chains run on fresh state rather than recursively on stale
//! snapshots. Full-canvas runs visit nodes in insertion order and keep
//! going past failures.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;

use crate::capability;
use crate::catalog::NodeCatalog;
use crate::definition::NodeDefinition;
use crate::error::{CanvasError, Result};
use crate::events::{CanvasEvent, EventSink};
use crate::gestures::{GestureController, GestureUpdate, PointerButton, PointerTarget};
use crate::lock::DrawLock;
use crate::services::{ImageGenerationService, TextGenerationService};
use crate::store::{CanvasStore, ConnectOutcome};
use crate::strategies;
use crate::types::{CanvasDocument, NodeData, NodeId, NodeStatus, Point, ViewTransform};
use crate::validation::validate_document;

/// Write a node's execution bookkeeping in one step
///
/// Existence was checked by the caller; a node removed in between is
/// simply not written.
fn write_run_state(
    store: &mut CanvasStore,
    node_id: &str,
    status: NodeStatus,
    error: Option<String>,
    execution_time: Option<String>,
) {
    let _ = store.set_status(node_id, status);
    let _ = store.set_error(node_id, error);
    let _ = store.set_execution_time(node_id, execution_time);
}

/// Mutable canvas state guarded by one lock
struct EngineState {
    store: CanvasStore,
    transform: ViewTransform,
    gestures: GestureController,
    /// The node currently (or most recently) executing
    highlight: Option<NodeId>,
    /// True for the duration of a full-canvas run
    workflow_running: bool,
    /// Auto-reactive targets awaiting execution, drained FIFO
    deferred: VecDeque<NodeId>,
}

/// The canvas engine
///
/// Cheap to share: wrap in an [`Arc`] and call from any task. State is
/// never held across a generation call; a node that vanishes while its
/// strategy is in flight is detected before anything is written back.
pub struct CanvasEngine {
    state: RwLock<EngineState>,
    catalog: RwLock<NodeCatalog>,
    draw_lock: DrawLock,
    events: Arc<dyn EventSink>,
    text_service: Arc<dyn TextGenerationService>,
    image_service: Arc<dyn ImageGenerationService>,
    /// Ceiling on deferred executions drained per trigger, against
    /// runaway auto-reactive cycles
    max_chain: usize,
}

impl CanvasEngine {
    /// Create an engine over a catalog and the two generation services
    pub fn new(
        catalog: NodeCatalog,
        text_service: Arc<dyn TextGenerationService>,
        image_service: Arc<dyn ImageGenerationService>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            state: RwLock::new(EngineState {
                store: CanvasStore::new(),
                transform: ViewTransform::default(),
                gestures: GestureController::new(),
                highlight: None,
                workflow_running: false,
                deferred: VecDeque::new(),
            }),
            catalog: RwLock::new(catalog),
            draw_lock: DrawLock::new(Arc::clone(&events)),
            events,
            text_service,
            image_service,
            max_chain: 1000,
        }
    }

    /// Set the ceiling on chained deferred executions
    pub fn with_max_chain(mut self, max_chain: usize) -> Self {
        self.max_chain = max_chain;
        self
    }

    // -----------------------------------------------------------------------
    // Document operations
    // -----------------------------------------------------------------------

    /// Place a new node of a registered type at a world position
    ///
    /// Refused while a drawing tool holds the canvas.
    pub async fn add_node(&self, type_name: &str, x: f64, y: f64) -> Result<NodeId> {
        if self.draw_lock.is_held() {
            return Err(CanvasError::DrawingLocked);
        }
        let node = self.catalog.read().await.instantiate(type_name, x, y)?;
        let node_id = node.id.clone();
        self.state.write().await.store.insert_node(node);

        log::debug!("added node '{}' of type '{}'", node_id, type_name);
        let _ = self.events.send(CanvasEvent::NodeAdded {
            node_id: node_id.clone(),
            type_name: type_name.to_string(),
        });
        Ok(node_id)
    }

    /// Remove a node and every edge attached to it
    ///
    /// Releases the drawing lock if the removed node held it.
    pub async fn remove_node(&self, node_id: &str) -> Result<()> {
        let removed = {
            let mut state = self.state.write().await;
            let removed = state.store.remove_node(node_id)?;
            if state.highlight.as_deref() == Some(node_id) {
                state.highlight = None;
            }
            removed
        };

        if self.draw_lock.is_held_by(node_id) {
            self.draw_lock.release(node_id);
        }

        log::debug!(
            "removed node '{}' and {} attached edges",
            node_id,
            removed.edges.len()
        );
        let _ = self.events.send(CanvasEvent::NodeRemoved {
            node_id: node_id.to_string(),
        });
        Ok(())
    }

    /// Connect an output port to an input port
    ///
    /// Emits `EdgeAdded` on success (carrying the id of any displaced edge)
    /// or `EdgeRejected` when the store refuses the connection.
    pub async fn connect(
        &self,
        source_node_id: &str,
        source_output_id: &str,
        target_node_id: &str,
        target_input_id: &str,
    ) -> Result<ConnectOutcome> {
        let outcome = self.state.write().await.store.connect(
            source_node_id,
            source_output_id,
            target_node_id,
            target_input_id,
        );

        match outcome {
            Ok(outcome) => {
                let _ = self.events.send(CanvasEvent::EdgeAdded {
                    edge_id: outcome.edge.id.clone(),
                    replaced_edge_id: outcome.replaced_edge_id.clone(),
                });
                Ok(outcome)
            }
            Err(error) => {
                log::info!("connection rejected: {}", error);
                let _ = self.events.send(CanvasEvent::EdgeRejected {
                    reason: error.to_string(),
                });
                Err(error)
            }
        }
    }

    /// Remove an edge by id
    pub async fn disconnect(&self, edge_id: &str) -> Result<()> {
        let edge = self.state.write().await.store.disconnect(edge_id)?;
        log::debug!(
            "disconnected '{}' from '{}'",
            edge.source_node_id,
            edge.target_node_id
        );
        Ok(())
    }

    /// Write one value into a node's data map
    ///
    /// User edits come through here (typed text, picked files, committed
    /// sketches). Writes never propagate by themselves; only a successful
    /// execution pushes values downstream.
    pub async fn update_node_value(
        &self,
        node_id: &str,
        key: &str,
        value: serde_json::Value,
    ) -> Result<()> {
        self.state.write().await.store.set_value(node_id, key, value)
    }

    /// Drop every node and edge, release the lock, abandon gestures
    ///
    /// The view transform is kept; clearing the canvas does not move the
    /// camera.
    pub async fn clear(&self) {
        {
            let mut state = self.state.write().await;
            state.store.clear();
            state.highlight = None;
            state.deferred.clear();
            state.gestures.cancel();
        }
        if let Some(holder) = self.draw_lock.holder() {
            self.draw_lock.release(&holder);
        }
        log::debug!("canvas cleared");
    }

    /// Snapshot of the current document
    pub async fn document(&self) -> CanvasDocument {
        self.state.read().await.store.document().clone()
    }

    /// Snapshot of one node
    pub async fn node(&self, node_id: &str) -> Option<NodeData> {
        self.state.read().await.store.node(node_id).cloned()
    }

    /// Serialize the document to JSON
    pub async fn save_json(&self) -> Result<String> {
        self.state.read().await.store.to_json()
    }

    /// Replace the document with one parsed from JSON
    ///
    /// The incoming document is validated first; hard structural issues
    /// refuse the load, soft ones are logged and accepted.
    pub async fn load_json(&self, json: &str) -> Result<()> {
        let document: CanvasDocument = serde_json::from_str(json)?;

        let issues = validate_document(&document);
        let hard: Vec<String> = issues
            .iter()
            .filter(|issue| issue.is_hard())
            .map(|issue| issue.to_string())
            .collect();
        if !hard.is_empty() {
            return Err(CanvasError::InvalidDocument(hard.join("; ")));
        }
        for issue in &issues {
            log::warn!("loaded document issue: {}", issue);
        }

        {
            let mut state = self.state.write().await;
            state.store = CanvasStore::from_document(document);
            state.highlight = None;
            state.deferred.clear();
            state.gestures.cancel();
        }
        if let Some(holder) = self.draw_lock.holder() {
            self.draw_lock.release(&holder);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Catalog operations
    // -----------------------------------------------------------------------

    /// Register a definition (built-in or newly defined at runtime)
    ///
    /// Refused while a drawing tool holds the canvas, so a definition flow
    /// cannot interleave with an exclusive surface interaction.
    pub async fn register_definition(&self, definition: NodeDefinition) -> Result<()> {
        if self.draw_lock.is_held() {
            return Err(CanvasError::DrawingLocked);
        }
        log::info!("registered node definition '{}'", definition.name);
        self.catalog.write().await.register(definition);
        Ok(())
    }

    /// Snapshot of every registered definition, ordered by name
    pub async fn definitions(&self) -> Vec<NodeDefinition> {
        self.catalog.read().await.all().into_iter().cloned().collect()
    }

    // -----------------------------------------------------------------------
    // View and pointer input
    // -----------------------------------------------------------------------

    /// Current view transform
    pub async fn view_transform(&self) -> ViewTransform {
        self.state.read().await.transform
    }

    /// Zoom about a viewport cursor position
    ///
    /// Inert while a drawing tool holds the canvas; strokes must not move
    /// the world under the pen.
    pub async fn wheel_zoom(&self, cursor: Point, delta: f64) {
        if self.draw_lock.is_held() {
            return;
        }
        let mut state = self.state.write().await;
        state.transform = state.transform.zoomed_about(cursor, delta);
    }

    /// Feed a pointer press
    pub async fn pointer_down(&self, target: &PointerTarget, cursor: Point, button: PointerButton) {
        let holder = self.draw_lock.holder();
        let mut state = self.state.write().await;
        let EngineState {
            store,
            transform,
            gestures,
            ..
        } = &mut *state;
        gestures.pointer_down(
            target,
            cursor,
            button,
            store.document(),
            transform,
            holder.as_deref(),
        );
    }

    /// Feed pointer motion, applying whatever the active gesture asks for
    pub async fn pointer_move(&self, cursor: Point) {
        let lock_held = self.draw_lock.is_held();
        let mut state = self.state.write().await;
        let EngineState {
            store,
            transform,
            gestures,
            ..
        } = &mut *state;

        match gestures.pointer_move(cursor, transform, lock_held) {
            Some(GestureUpdate::Pan { transform: next }) => *transform = next,
            Some(GestureUpdate::MoveNode { node_id, x, y }) => {
                if store.move_node(&node_id, x, y).is_err() {
                    gestures.cancel();
                }
            }
            Some(GestureUpdate::ResizeNode {
                node_id,
                width,
                height,
            }) => {
                if store.resize_node(&node_id, width, height).is_err() {
                    gestures.cancel();
                }
            }
            None => {}
        }
    }

    /// Feed a pointer release
    ///
    /// A wire released over an input port becomes a connection attempt; the
    /// outcome is `None` when nothing was connected (no wire in flight, or
    /// the store rejected it and emitted `EdgeRejected`).
    pub async fn pointer_up(&self, target: Option<&PointerTarget>) -> Option<ConnectOutcome> {
        let request = {
            let mut state = self.state.write().await;
            let lock_held = self.draw_lock.is_held();
            state.gestures.pointer_up(target, lock_held)
        };

        match request {
            Some(request) => self
                .connect(
                    &request.source_node_id,
                    &request.source_output_id,
                    &request.target_node_id,
                    &request.target_input_id,
                )
                .await
                .ok(),
            None => None,
        }
    }

    /// The pointer left the canvas: abandon any gesture in flight
    pub async fn pointer_leave(&self) {
        let mut state = self.state.write().await;
        let _ = state.gestures.pointer_leave();
    }

    /// The wire being dragged, as (source anchor, cursor) viewport points
    pub async fn pending_wire(&self) -> Option<(Point, Point)> {
        self.state.read().await.gestures.pending_wire()
    }

    // -----------------------------------------------------------------------
    // Drawing lock
    // -----------------------------------------------------------------------

    /// Take the exclusive interaction lock for a node's drawing surface
    ///
    /// Only kinds with an exclusive surface can hold it. Returns whether
    /// the lock is now held by this node. Any gesture in flight is
    /// abandoned on acquisition.
    pub async fn begin_drawing(&self, node_id: &str) -> bool {
        let kind = self
            .state
            .read()
            .await
            .store
            .node(node_id)
            .map(|node| node.kind.clone());
        let Some(kind) = kind else {
            return false;
        };

        let acquired = self.draw_lock.acquire(node_id, &kind);
        if acquired {
            self.state.write().await.gestures.cancel();
        }
        acquired
    }

    /// Release the exclusive interaction lock
    pub async fn end_drawing(&self, node_id: &str) -> bool {
        self.draw_lock.release(node_id)
    }

    /// The node currently holding the drawing lock
    pub fn lock_holder(&self) -> Option<NodeId> {
        self.draw_lock.holder()
    }

    /// The node currently (or most recently) executing
    pub async fn highlighted_node(&self) -> Option<NodeId> {
        self.state.read().await.highlight.clone()
    }

    /// Whether a full-canvas run is in progress
    pub async fn is_workflow_running(&self) -> bool {
        self.state.read().await.workflow_running
    }

    // -----------------------------------------------------------------------
    // Execution
    // -----------------------------------------------------------------------

    /// Execute one node, then drain any auto-reactive executions it queued
    ///
    /// Returns the node's final status. A vanished node reports `Error`
    /// without touching anything; a node blocked by another node's drawing
    /// lock reports `Idle` without touching anything.
    pub async fn execute_node(&self, node_id: &str) -> NodeStatus {
        let status = self.execute_inner(node_id).await;
        self.drain_deferred().await;
        status
    }

    /// Run every node in insertion order, continuing past failures
    ///
    /// Refused while a drawing tool holds the canvas. Downstream values
    /// still propagate during the run, but auto-reactive re-execution is
    /// suppressed; the run itself visits every node exactly once.
    pub async fn run_workflow(&self) -> Result<()> {
        if self.draw_lock.is_held() {
            log::warn!(
                "workflow run refused: drawing tool active on {:?}",
                self.draw_lock.holder()
            );
            return Err(CanvasError::DrawingLocked);
        }

        let node_ids: Vec<NodeId> = {
            let mut state = self.state.write().await;
            if state.workflow_running {
                log::debug!("workflow run already in progress");
                return Ok(());
            }
            state.workflow_running = true;
            state
                .store
                .document()
                .nodes
                .iter()
                .map(|node| node.id.clone())
                .collect()
        };

        log::info!("workflow run started over {} nodes", node_ids.len());
        let _ = self.events.send(CanvasEvent::WorkflowStarted {
            node_count: node_ids.len(),
        });

        for node_id in &node_ids {
            let exists = self.state.read().await.store.node(node_id).is_some();
            if !exists {
                continue;
            }
            let status = self.execute_inner(node_id).await;
            if status == NodeStatus::Error {
                log::warn!("node '{}' failed during workflow run, continuing", node_id);
            }
        }

        {
            let mut state = self.state.write().await;
            state.workflow_running = false;
            state.highlight = None;
        }
        let _ = self.events.send(CanvasEvent::WorkflowCompleted);
        Ok(())
    }

    /// Execute one node without draining the deferred queue
    async fn execute_inner(&self, node_id: &str) -> NodeStatus {
        // Prologue: gate, mark running, snapshot for the strategy
        let (node, document) = {
            let mut state = self.state.write().await;
            let Some(existing) = state.store.node(node_id) else {
                return NodeStatus::Error;
            };
            let node = existing.clone();

            if !state.workflow_running
                && self.draw_lock.is_held_by_other(node_id)
                && !capability::has_exclusive_surface(&node.kind)
            {
                log::warn!(
                    "execution of node '{}' blocked: drawing tool active on {:?}",
                    node_id,
                    self.draw_lock.holder()
                );
                return NodeStatus::Idle;
            }

            state.highlight = Some(node_id.to_string());
            write_run_state(
                &mut state.store,
                node_id,
                NodeStatus::Running,
                None,
                Some("...".to_string()),
            );

            let document = state.store.document().clone();
            (node, document)
        };

        let _ = self.events.send(CanvasEvent::node_started(node_id));
        let started = Instant::now();
        let result = strategies::execute(
            &node,
            &document,
            self.text_service.as_ref(),
            self.image_service.as_ref(),
        )
        .await;
        let elapsed = format!("{:.2}s", started.elapsed().as_secs_f64());

        let mut state = self.state.write().await;

        // Stale-completion guard: the node may have been removed while the
        // strategy was in flight
        if state.store.node(node_id).is_none() {
            log::debug!("node '{}' vanished during execution, discarding result", node_id);
            return NodeStatus::Error;
        }

        let status = match result {
            Ok(outputs) => {
                let _ = state.store.set_values(node_id, outputs);
                write_run_state(
                    &mut state.store,
                    node_id,
                    NodeStatus::Success,
                    None,
                    Some(elapsed),
                );

                let _ = self.events.send(CanvasEvent::NodeSucceeded {
                    node_id: node_id.to_string(),
                });
                self.propagate(&mut state, node_id);
                NodeStatus::Success
            }
            Err(message) => {
                log::warn!("node '{}' failed: {}", node_id, message);
                write_run_state(
                    &mut state.store,
                    node_id,
                    NodeStatus::Error,
                    Some(message.clone()),
                    Some(elapsed),
                );

                let _ = self.events.send(CanvasEvent::node_failed(node_id, message));
                NodeStatus::Error
            }
        };

        if !state.workflow_running && state.highlight.as_deref() == Some(node_id) {
            state.highlight = None;
        }
        status
    }

    /// Push a successful node's output values across its outgoing edges
    ///
    /// Each copied-into target is reset to idle with its error and timing
    /// cleared; auto-reactive targets are queued for deferred execution
    /// unless a full-canvas run is already visiting every node.
    fn propagate(&self, state: &mut EngineState, source_id: &str) {
        let Some(source) = state.store.node(source_id) else {
            return;
        };

        let copies: Vec<(NodeId, String, serde_json::Value)> = state
            .store
            .document()
            .outgoing_edges(source_id)
            .filter_map(|edge| {
                let port = source.output(&edge.source_output_id)?;
                let value = source.value(&port.id)?.clone();
                Some((
                    edge.target_node_id.clone(),
                    edge.target_input_id.clone(),
                    value,
                ))
            })
            .collect();

        for (target_id, input_id, value) in copies {
            let auto = match state.store.node(&target_id) {
                Some(target) if target.input(&input_id).is_some() => target.kind.is_auto_reactive(),
                _ => continue,
            };

            let _ = state.store.set_value(&target_id, &input_id, value);
            write_run_state(&mut state.store, &target_id, NodeStatus::Idle, None, None);

            if auto && !state.workflow_running {
                state.deferred.push_back(target_id);
            }
        }
    }

    /// Drain the deferred queue, executing each entry in turn
    ///
    /// Entries queued by the drained executions join the same queue, so a
    /// chain A → B → C runs strictly in order. The chain ceiling guards
    /// against auto-reactive cycles that would otherwise never settle.
    async fn drain_deferred(&self) {
        let mut executed = 0usize;
        loop {
            let next = self.state.write().await.deferred.pop_front();
            let Some(node_id) = next else {
                break;
            };

            if executed >= self.max_chain {
                log::warn!(
                    "deferred execution ceiling reached ({}), dropping remaining queue",
                    self.max_chain
                );
                self.state.write().await.deferred.clear();
                break;
            }
            executed += 1;
            self.execute_inner(&node_id).await;
        }
    }
}
