//! Fluent builder for canvas documents
//!
//! Programmatic document construction for tests and tooling. Nodes are
//! instantiated from definitions exactly as the catalog would place them,
//! but with caller-chosen ids so assertions stay deterministic.

use crate::catalog::instantiate_definition;
use crate::definition::NodeDefinition;
use crate::types::{CanvasDocument, Edge, NodeData};

/// Fluent builder for constructing canvas documents
///
/// # Example
///
/// ```ignore
/// let document = DocumentBuilder::new()
///     .place("source", &text_input_definition(), (0.0, 0.0))
///     .with_value("text_out", serde_json::json!("Hello"))
///     .place("sink", &display_text_definition(), (300.0, 0.0))
///     .connect("source", "text_out", "sink", "text_in")
///     .build();
/// ```
#[derive(Default)]
pub struct DocumentBuilder {
    nodes: Vec<NodeData>,
    edges: Vec<Edge>,
    edge_counter: usize,
}

impl DocumentBuilder {
    /// Create a new empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a node instantiated from a definition, overriding the
    /// generated instance id with the given one
    pub fn place(
        mut self,
        id: impl Into<String>,
        definition: &NodeDefinition,
        position: (f64, f64),
    ) -> Self {
        let mut node = instantiate_definition(definition, position.0, position.1);
        node.id = id.into();
        self.nodes.push(node);
        self
    }

    /// Set a data-map value on the most recently placed node
    ///
    /// Must be called after `place`.
    pub fn with_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.data.insert(key.into(), value);
        }
        self
    }

    /// Connect two placed nodes (auto-generates the edge id)
    pub fn connect(
        mut self,
        source_node: impl Into<String>,
        source_output: impl Into<String>,
        target_node: impl Into<String>,
        target_input: impl Into<String>,
    ) -> Self {
        self.edge_counter += 1;
        let id = format!("edge-{}", self.edge_counter);
        self.connect_with_id(id, source_node, source_output, target_node, target_input)
    }

    /// Connect two placed nodes with an explicit edge id
    pub fn connect_with_id(
        mut self,
        edge_id: impl Into<String>,
        source_node: impl Into<String>,
        source_output: impl Into<String>,
        target_node: impl Into<String>,
        target_input: impl Into<String>,
    ) -> Self {
        self.edges.push(Edge {
            id: edge_id.into(),
            source_node_id: source_node.into(),
            source_output_id: source_output.into(),
            target_node_id: target_node.into(),
            target_input_id: target_input.into(),
        });
        self
    }

    /// Build the document without validation
    pub fn build(self) -> CanvasDocument {
        CanvasDocument {
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}
