//! Canvas document store
//!
//! Owns the authoritative `CanvasDocument` and every mutation of it. All
//! structural rules live here: edge endpoint validation, the
//! one-edge-per-input replacement rule, cascade removal, and size clamping.
//! The store emits nothing and talks to no services; the engine layers
//! events and execution on top.

use uuid::Uuid;

use crate::error::{CanvasError, Result};
use crate::types::{
    CanvasDocument, Edge, EdgeId, NodeData, NodeStatus, MIN_NODE_HEIGHT, MIN_NODE_WIDTH,
};

/// A node removal along with the edges that went with it
#[derive(Debug, Clone)]
pub struct RemovedNode {
    pub node: NodeData,
    pub edges: Vec<Edge>,
}

/// A successful connection
#[derive(Debug, Clone)]
pub struct ConnectOutcome {
    pub edge: Edge,
    /// Edge that previously fed the same input, displaced by this one
    pub replaced_edge_id: Option<EdgeId>,
    /// Whether the source's current value was copied into the target
    /// immediately (source had already run successfully)
    pub value_copied: bool,
}

/// Mutable store for one canvas document
#[derive(Debug, Default)]
pub struct CanvasStore {
    document: CanvasDocument,
}

impl CanvasStore {
    pub fn new() -> Self {
        Self {
            document: CanvasDocument::default(),
        }
    }

    pub fn from_document(document: CanvasDocument) -> Self {
        Self { document }
    }

    /// Read access to the current document
    pub fn document(&self) -> &CanvasDocument {
        &self.document
    }

    pub fn into_document(self) -> CanvasDocument {
        self.document
    }

    /// Find a node by id
    pub fn node(&self, node_id: &str) -> Option<&NodeData> {
        self.document.find_node(node_id)
    }

    fn node_mut(&mut self, node_id: &str) -> Result<&mut NodeData> {
        self.document
            .find_node_mut(node_id)
            .ok_or_else(|| CanvasError::NodeNotFound(node_id.to_string()))
    }

    /// Append a node. Instances come from the catalog factory; the store
    /// only records them.
    pub fn insert_node(&mut self, node: NodeData) {
        self.document.nodes.push(node);
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, node_id: &str) -> Result<RemovedNode> {
        let index = self
            .document
            .nodes
            .iter()
            .position(|n| n.id == node_id)
            .ok_or_else(|| CanvasError::NodeNotFound(node_id.to_string()))?;
        let node = self.document.nodes.remove(index);

        let mut removed_edges = Vec::new();
        self.document.edges.retain(|edge| {
            let attached = edge.source_node_id == node_id || edge.target_node_id == node_id;
            if attached {
                removed_edges.push(edge.clone());
            }
            !attached
        });

        Ok(RemovedNode {
            node,
            edges: removed_edges,
        })
    }

    /// Connect an output port to an input port.
    ///
    /// Validates both endpoints and their kinds (wildcard `any` matches
    /// everything, otherwise kinds must be equal). An input holds at most
    /// one edge: connecting over an occupied input displaces the old edge.
    /// If the source node has already run successfully and holds a value
    /// for the output, that value is copied into the target right away and
    /// the target is reset to idle so the new data is visibly pending.
    pub fn connect(
        &mut self,
        source_node_id: &str,
        source_output_id: &str,
        target_node_id: &str,
        target_input_id: &str,
    ) -> Result<ConnectOutcome> {
        let source = self
            .document
            .find_node(source_node_id)
            .ok_or_else(|| CanvasError::NodeNotFound(source_node_id.to_string()))?;
        let source_port =
            source
                .output(source_output_id)
                .ok_or_else(|| CanvasError::PortNotFound {
                    node: source_node_id.to_string(),
                    port: source_output_id.to_string(),
                })?;
        let source_kind = source_port.data_kind;
        let pending_value = if source.status == NodeStatus::Success {
            source.data.get(source_output_id).cloned()
        } else {
            None
        };

        let target = self
            .document
            .find_node(target_node_id)
            .ok_or_else(|| CanvasError::NodeNotFound(target_node_id.to_string()))?;
        let target_port =
            target
                .input(target_input_id)
                .ok_or_else(|| CanvasError::PortNotFound {
                    node: target_node_id.to_string(),
                    port: target_input_id.to_string(),
                })?;

        if !source_kind.is_compatible_with(&target_port.data_kind) {
            return Err(CanvasError::IncompatibleKinds {
                source_kind: source_kind.as_str().to_string(),
                target_kind: target_port.data_kind.as_str().to_string(),
            });
        }

        let replaced_edge_id = self
            .document
            .edge_into(target_node_id, target_input_id)
            .map(|edge| edge.id.clone());
        if let Some(replaced) = &replaced_edge_id {
            self.document.edges.retain(|e| &e.id != replaced);
        }

        let edge = Edge {
            id: format!("edge-{}", Uuid::new_v4()),
            source_node_id: source_node_id.to_string(),
            source_output_id: source_output_id.to_string(),
            target_node_id: target_node_id.to_string(),
            target_input_id: target_input_id.to_string(),
        };
        self.document.edges.push(edge.clone());

        let value_copied = if let Some(value) = pending_value {
            let target = self.node_mut(target_node_id)?;
            target.data.insert(target_input_id.to_string(), value);
            target.status = NodeStatus::Idle;
            target.error = None;
            // Last execution time stays visible until the node runs again
            true
        } else {
            false
        };

        Ok(ConnectOutcome {
            edge,
            replaced_edge_id,
            value_copied,
        })
    }

    /// Remove an edge by id
    pub fn disconnect(&mut self, edge_id: &str) -> Result<Edge> {
        let index = self
            .document
            .edges
            .iter()
            .position(|e| e.id == edge_id)
            .ok_or_else(|| CanvasError::EdgeNotFound(edge_id.to_string()))?;
        Ok(self.document.edges.remove(index))
    }

    /// Move a node to a new world position
    pub fn move_node(&mut self, node_id: &str, x: f64, y: f64) -> Result<()> {
        let node = self.node_mut(node_id)?;
        node.x = x;
        node.y = y;
        Ok(())
    }

    /// Resize a node, clamped to the minimum size
    pub fn resize_node(&mut self, node_id: &str, width: f64, height: f64) -> Result<()> {
        let node = self.node_mut(node_id)?;
        node.width = width.max(MIN_NODE_WIDTH);
        node.height = height.max(MIN_NODE_HEIGHT);
        Ok(())
    }

    /// Write values into a node's data map
    pub fn set_values(
        &mut self,
        node_id: &str,
        changes: impl IntoIterator<Item = (String, serde_json::Value)>,
    ) -> Result<()> {
        let node = self.node_mut(node_id)?;
        for (key, value) in changes {
            node.data.insert(key, value);
        }
        Ok(())
    }

    /// Write one value into a node's data map
    pub fn set_value(&mut self, node_id: &str, key: &str, value: serde_json::Value) -> Result<()> {
        self.set_values(node_id, [(key.to_string(), value)])
    }

    /// Set a node's execution status
    pub fn set_status(&mut self, node_id: &str, status: NodeStatus) -> Result<()> {
        self.node_mut(node_id)?.status = status;
        Ok(())
    }

    /// Set or clear a node's error message
    pub fn set_error(&mut self, node_id: &str, error: Option<String>) -> Result<()> {
        self.node_mut(node_id)?.error = error;
        Ok(())
    }

    /// Set or clear a node's displayed execution time
    pub fn set_execution_time(&mut self, node_id: &str, time: Option<String>) -> Result<()> {
        self.node_mut(node_id)?.execution_time = time;
        Ok(())
    }

    /// Drop every node and edge
    pub fn clear(&mut self) {
        self.document.nodes.clear();
        self.document.edges.clear();
    }

    /// Serialize the document to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.document)?)
    }

    /// Replace the document with one parsed from JSON
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        self.document = serde_json::from_str(json)?;
        Ok(())
    }
}
