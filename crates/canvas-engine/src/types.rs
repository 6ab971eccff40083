//! Core types for the canvas document model
//!
//! These types define the persisted shape of a canvas: placed nodes with
//! their ports and value maps, the directed edges wiring outputs to inputs,
//! and the view transform that maps world coordinates onto the screen.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Unique identifier for a node instance
pub type NodeId = String;

/// Unique identifier for an edge
pub type EdgeId = String;

/// Unique identifier for a port
pub type PortId = String;

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Standard width for newly placed nodes
pub const DEFAULT_NODE_WIDTH: f64 = 220.0;
/// Base height for newly placed nodes (kind-specific fallbacks may override)
pub const DEFAULT_NODE_HEIGHT: f64 = 100.0;
/// Smallest width a resize gesture may reach
pub const MIN_NODE_WIDTH: f64 = 180.0;
/// Smallest height a resize gesture may reach
pub const MIN_NODE_HEIGHT: f64 = 80.0;
/// Height of the node title bar
pub const NODE_HEADER_HEIGHT: f64 = 36.0;
/// Vertical padding between the header and the port stack
pub const NODE_PADDING_Y: f64 = 6.0;
/// Fixed per-port spacing used when the body is shorter than the port stack
pub const PORT_SPACING: f64 = 25.0;
/// Height of one port pill
pub const PORT_PILL_HEIGHT: f64 = 20.0;
/// Gap between stacked port pills
pub const PORT_PILL_GAP: f64 = 4.0;
/// Footer height reserved when a node shows an error message
pub const ERROR_FOOTER_HEIGHT: f64 = 30.0;
/// Footer height reserved when a node shows its last execution time
pub const TIMING_FOOTER_HEIGHT: f64 = 20.0;

/// Lower bound for the view scale
pub const MIN_ZOOM: f64 = 0.2;
/// Upper bound for the view scale
pub const MAX_ZOOM: f64 = 2.0;
/// Per-wheel-unit zoom sensitivity
pub const ZOOM_SENSITIVITY: f64 = 0.0015;

/// Data-map key holding a prompt typed directly into a node's body, as
/// opposed to one arriving through the `prompt_in` port.
pub const UI_PROMPT_KEY: &str = "ui_prompt_value";

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// The declared data kind of a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    /// Text string
    Text,
    /// Image data (data-URI encoded)
    Image,
    /// Numeric value
    Number,
    /// Boolean value
    Boolean,
    /// JSON object or array
    Json,
    /// Wildcard, accepts or produces anything
    Any,
}

impl DataKind {
    /// Connection compatibility: the wildcard matches everything, otherwise
    /// the kinds must be identical. No coercion.
    pub fn is_compatible_with(&self, other: &DataKind) -> bool {
        matches!(self, DataKind::Any) || matches!(other, DataKind::Any) || self == other
    }

    /// Lowercase name as used in messages and templates
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Text => "text",
            DataKind::Image => "image",
            DataKind::Number => "number",
            DataKind::Boolean => "boolean",
            DataKind::Json => "json",
            DataKind::Any => "any",
        }
    }
}

/// Whether a port consumes or produces values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortRole {
    Input,
    Output,
}

/// A named, typed attachment point on a node instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    /// Identifier, unique within this node's input or output list
    pub id: PortId,
    /// Human-readable label
    pub name: String,
    /// Consumes or produces
    pub role: PortRole,
    /// Declared data kind
    pub data_kind: DataKind,
    /// Optional example value seeded into the data map at placement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_value: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Node kinds
// ---------------------------------------------------------------------------

/// Tags for the statically known node behaviors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltInKind {
    /// Plain value source: emits locally typed text
    TextInput,
    /// Prompt forwarded to the configured generation service, web
    /// augmentation honored
    LlmPrompt,
    /// Prompt forwarded to a local generation runtime, never augmented
    LocalLlmPrompt,
    /// Text-to-image generation
    ImageGenerator,
    /// Pass-through view of any connected value
    DisplayData,
    /// Pass-through view of a connected image
    DisplayImage,
    /// Pass-through view of connected text
    DisplayText,
    /// Freehand drawing surface, the only exclusive-interaction kind
    Sketchpad,
    /// Emits a previously selected local model identifier
    ModelFileSelector,
    /// Joins up to five typed parts into one prompt string
    PromptAssembler,
}

impl BuiltInKind {
    /// Kinds that re-execute automatically when a new value propagates into
    /// them. Display kinds deliberately never auto-refresh.
    pub fn is_auto_reactive(&self) -> bool {
        matches!(
            self,
            BuiltInKind::LlmPrompt
                | BuiltInKind::LocalLlmPrompt
                | BuiltInKind::ImageGenerator
                | BuiltInKind::PromptAssembler
        )
    }

    /// Fallback body height used when the definition carries no override
    pub fn default_height(&self) -> f64 {
        match self {
            BuiltInKind::ImageGenerator => 150.0,
            BuiltInKind::Sketchpad => 220.0,
            BuiltInKind::ModelFileSelector => 110.0,
            BuiltInKind::LlmPrompt | BuiltInKind::LocalLlmPrompt => 130.0,
            BuiltInKind::PromptAssembler => 180.0,
            _ => DEFAULT_NODE_HEIGHT,
        }
    }
}

/// Execution template carried by a runtime-defined node kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSpec {
    /// Prompt template with `{port_id}` placeholders
    pub template: String,
    /// Whether the generation call may augment from the web
    #[serde(default)]
    pub web_augmentation: bool,
    /// Marks the type-adapter specialization: the template additionally
    /// receives the downstream target's declared kind and names
    #[serde(default)]
    pub adapts_to_target: bool,
}

impl TemplateSpec {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            web_augmentation: false,
            adapts_to_target: false,
        }
    }

    pub fn with_web_augmentation(mut self) -> Self {
        self.web_augmentation = true;
        self
    }

    pub fn adapting_to_target(mut self) -> Self {
        self.adapts_to_target = true;
        self
    }
}

/// Closed sum over node behaviors: a statically known tag, or a
/// runtime-registered execution template. The execution engine dispatches
/// on this by pattern matching, never by type-name comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    BuiltIn { tag: BuiltInKind },
    Templated {
        #[serde(flatten)]
        spec: TemplateSpec,
    },
}

impl NodeKind {
    pub fn built_in(tag: BuiltInKind) -> Self {
        NodeKind::BuiltIn { tag }
    }

    pub fn templated(spec: TemplateSpec) -> Self {
        NodeKind::Templated { spec }
    }

    /// Whether propagation schedules this kind for re-execution
    pub fn is_auto_reactive(&self) -> bool {
        match self {
            NodeKind::BuiltIn { tag } => tag.is_auto_reactive(),
            NodeKind::Templated { .. } => true,
        }
    }

    /// The built-in tag, if this is a built-in kind
    pub fn built_in_tag(&self) -> Option<BuiltInKind> {
        match self {
            NodeKind::BuiltIn { tag } => Some(*tag),
            NodeKind::Templated { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Node and edge instances
// ---------------------------------------------------------------------------

/// Execution status of a node, drives visual state and gates propagation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Idle,
    Running,
    Success,
    Error,
}

/// A placed node instance
///
/// The `data` map doubles as current input values, produced output values,
/// and node-local state (for example a prompt typed into the body). Every
/// value is plain JSON so the document round-trips through serialization
/// with no loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    /// Stable unique id
    pub id: NodeId,
    /// Behavior dispatched by the execution engine
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Catalog type name this instance was created from
    #[serde(rename = "type")]
    pub type_name: String,
    /// Display name (defaults to the type name)
    pub name: String,
    /// World-space position
    pub x: f64,
    pub y: f64,
    /// World-space size
    pub width: f64,
    pub height: f64,
    /// Ordered input ports
    pub inputs: Vec<Port>,
    /// Ordered output ports
    pub outputs: Vec<Port>,
    /// Port values and node-local state
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
    /// Whether generation calls from this node may augment from the web
    /// (resolved from the definition at placement)
    #[serde(default)]
    pub web_augmentation: bool,
    /// Execution status
    pub status: NodeStatus,
    /// Last execution error, cleared on each run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Last execution duration, rendered for display
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<String>,
    /// Header color token
    pub color: String,
    /// Glyph shown in the header
    pub icon: String,
    /// Catalog category
    pub category: String,
}

impl NodeData {
    /// Find an input port by id
    pub fn input(&self, port_id: &str) -> Option<&Port> {
        self.inputs.iter().find(|p| p.id == port_id)
    }

    /// Find an output port by id
    pub fn output(&self, port_id: &str) -> Option<&Port> {
        self.outputs.iter().find(|p| p.id == port_id)
    }

    /// Id of the first output port, if any
    pub fn first_output_id(&self) -> Option<&str> {
        self.outputs.first().map(|p| p.id.as_str())
    }

    /// Current value stored for a port or local key
    pub fn value(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Current value as a string, if it is one
    pub fn text_value(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }

    /// Whether this node's template, if any, adapts to its downstream target
    pub fn adapts_to_target(&self) -> bool {
        matches!(&self.kind, NodeKind::Templated { spec } if spec.adapts_to_target)
    }
}

/// A directed connection from one node's output port to another node's
/// input port. Immutable once created; "change" means delete and recreate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source_node_id: NodeId,
    pub source_output_id: PortId,
    pub target_node_id: NodeId,
    pub target_input_id: PortId,
}

// ---------------------------------------------------------------------------
// View transform and document
// ---------------------------------------------------------------------------

/// A point in either world or viewport space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The canvas view transform: world coordinates map to viewport coordinates
/// as `v = w * k + t`, with the scale bounded to [MIN_ZOOM, MAX_ZOOM].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            x: 150.0,
            y: 100.0,
            k: 1.0,
        }
    }
}

/// The serializable persistence unit: the two flat collections
///
/// Node order is insertion order, which is also the order a full-workflow
/// run executes nodes in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasDocument {
    pub nodes: Vec<NodeData>,
    pub edges: Vec<Edge>,
}

impl CanvasDocument {
    /// Find a node by id
    pub fn find_node(&self, id: &str) -> Option<&NodeData> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Find a node by id (mutable)
    pub fn find_node_mut(&mut self, id: &str) -> Option<&mut NodeData> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Edges leaving a node's outputs
    pub fn outgoing_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source_node_id == node_id)
    }

    /// Edges arriving at a node's inputs
    pub fn incoming_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.target_node_id == node_id)
    }

    /// The edge currently feeding a (node, input) pair, if any
    pub fn edge_into(&self, node_id: &str, input_id: &str) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.target_node_id == node_id && e.target_input_id == input_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_kind_compatibility() {
        assert!(DataKind::Any.is_compatible_with(&DataKind::Json));
        assert!(DataKind::Json.is_compatible_with(&DataKind::Any));
        assert!(DataKind::Text.is_compatible_with(&DataKind::Text));
        assert!(!DataKind::Text.is_compatible_with(&DataKind::Number));
        assert!(!DataKind::Image.is_compatible_with(&DataKind::Json));
    }

    #[test]
    fn test_auto_reactive_subset() {
        assert!(BuiltInKind::LlmPrompt.is_auto_reactive());
        assert!(BuiltInKind::LocalLlmPrompt.is_auto_reactive());
        assert!(BuiltInKind::ImageGenerator.is_auto_reactive());
        assert!(BuiltInKind::PromptAssembler.is_auto_reactive());
        assert!(!BuiltInKind::DisplayData.is_auto_reactive());
        assert!(!BuiltInKind::TextInput.is_auto_reactive());
        assert!(!BuiltInKind::Sketchpad.is_auto_reactive());

        assert!(NodeKind::templated(TemplateSpec::new("Do {x}")).is_auto_reactive());
    }

    #[test]
    fn test_node_kind_serialization() {
        let built_in = NodeKind::built_in(BuiltInKind::TextInput);
        let json = serde_json::to_value(&built_in).unwrap();
        assert_eq!(json["kind"], "built_in");
        assert_eq!(json["tag"], "text_input");

        let templated = NodeKind::templated(TemplateSpec::new("Summarize: {text_in}"));
        let json = serde_json::to_value(&templated).unwrap();
        assert_eq!(json["kind"], "templated");
        assert_eq!(json["template"], "Summarize: {text_in}");

        let back: NodeKind = serde_json::from_value(json).unwrap();
        assert_eq!(back, templated);
    }

    #[test]
    fn test_view_transform_default() {
        let t = ViewTransform::default();
        assert_eq!(t.x, 150.0);
        assert_eq!(t.y, 100.0);
        assert_eq!(t.k, 1.0);
    }

    #[test]
    fn test_document_lookups() {
        let mut doc = CanvasDocument::default();
        doc.edges.push(Edge {
            id: "edge-1".to_string(),
            source_node_id: "a".to_string(),
            source_output_id: "out".to_string(),
            target_node_id: "b".to_string(),
            target_input_id: "in".to_string(),
        });

        assert_eq!(doc.outgoing_edges("a").count(), 1);
        assert_eq!(doc.incoming_edges("b").count(), 1);
        assert!(doc.edge_into("b", "in").is_some());
        assert!(doc.edge_into("b", "other").is_none());
    }
}
