//! Exclusive drawing-lock coordination
//!
//! While a node with an exclusive body surface (the sketchpad) is being
//! drawn on, the whole canvas defers to it: gestures elsewhere are
//! swallowed and execution of other nodes is refused. This module owns the
//! single source of truth for who holds that lock.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::capability;
use crate::events::{CanvasEvent, EventSink};
use crate::types::{NodeId, NodeKind};

/// Coordinator for the canvas-wide exclusive interaction lock
///
/// At most one node holds the lock at a time. Acquisition is restricted to
/// kinds whose interaction profile declares an exclusive surface; everyone
/// else is refused without side effects.
pub struct DrawLock {
    holder: Mutex<Option<NodeId>>,
    events: Arc<dyn EventSink>,
}

impl DrawLock {
    pub fn new(events: Arc<dyn EventSink>) -> Self {
        Self {
            holder: Mutex::new(None),
            events,
        }
    }

    /// Try to take the lock for a node.
    ///
    /// Succeeds when the lock is free, or already held by this same node
    /// (idempotent re-acquire, no event). Refused when another node holds
    /// it or when the kind has no exclusive surface.
    pub fn acquire(&self, node_id: &str, kind: &NodeKind) -> bool {
        if !capability::has_exclusive_surface(kind) {
            return false;
        }

        let mut holder = self.holder.lock();
        match holder.as_deref() {
            Some(current) if current == node_id => true,
            Some(_) => false,
            None => {
                *holder = Some(node_id.to_string());
                drop(holder);
                let _ = self.events.send(CanvasEvent::LockAcquired {
                    node_id: node_id.to_string(),
                });
                true
            }
        }
    }

    /// Release the lock if this node holds it. Releasing a lock you do not
    /// hold is a no-op, so callers can release unconditionally on
    /// interaction end and on node removal.
    pub fn release(&self, node_id: &str) -> bool {
        let mut holder = self.holder.lock();
        if holder.as_deref() == Some(node_id) {
            *holder = None;
            drop(holder);
            let _ = self.events.send(CanvasEvent::LockReleased {
                node_id: node_id.to_string(),
            });
            true
        } else {
            false
        }
    }

    /// Current holder, if any
    pub fn holder(&self) -> Option<NodeId> {
        self.holder.lock().clone()
    }

    /// Whether any node holds the lock
    pub fn is_held(&self) -> bool {
        self.holder.lock().is_some()
    }

    /// Whether this node holds the lock
    pub fn is_held_by(&self, node_id: &str) -> bool {
        self.holder.lock().as_deref() == Some(node_id)
    }

    /// Whether a node other than this one holds the lock
    pub fn is_held_by_other(&self, node_id: &str) -> bool {
        matches!(self.holder.lock().as_deref(), Some(current) if current != node_id)
    }
}
