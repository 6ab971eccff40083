//! Node definitions: the catalog's blueprint type
//!
//! A `NodeDefinition` describes everything needed to place a node on the
//! canvas: behavior kind, ports, palette metadata, and sizing. Definitions
//! are the single source of truth: built-in node crates declare them once
//! and submit them via `inventory`, and runtime-defined agents construct
//! them from a generation response.

use serde::{Deserialize, Serialize};

use crate::types::{BuiltInKind, DataKind, NodeKind, TemplateSpec};

/// Declared port on a node definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortSpec {
    /// Port identifier, unique within the definition's side
    pub id: String,
    /// Human-readable label
    pub name: String,
    /// Data kind
    pub data_kind: DataKind,
    /// Seeded into the node's data map at placement, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_value: Option<serde_json::Value>,
}

impl PortSpec {
    /// Create a new port spec
    pub fn new(id: impl Into<String>, name: impl Into<String>, data_kind: DataKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data_kind,
            example_value: None,
        }
    }

    /// Attach an example value seeded at placement
    pub fn with_example(mut self, value: serde_json::Value) -> Self {
        self.example_value = Some(value);
        self
    }
}

/// Complete blueprint for a node type
///
/// The `name` doubles as the catalog key and the default display name of
/// placed instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDefinition {
    /// Unique type name (e.g., "Text Input")
    pub name: String,
    /// Description shown in the palette
    pub description: String,
    /// Behavior dispatched at execution time
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Input port declarations
    pub inputs: Vec<PortSpec>,
    /// Output port declarations
    pub outputs: Vec<PortSpec>,
    /// Header color token
    pub color: String,
    /// Glyph shown in the header and palette
    pub icon: String,
    /// Palette category
    pub category: String,
    /// For built-in prompt kinds: whether generation calls may augment
    /// from the web. Templated kinds carry this inside their spec instead.
    #[serde(default)]
    pub web_augmentation: bool,
    /// Width override for placed instances
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_width: Option<f64>,
    /// Height override for placed instances (otherwise the kind's fallback)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_height: Option<f64>,
}

impl NodeDefinition {
    fn new(name: impl Into<String>, description: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            inputs: Vec::new(),
            outputs: Vec::new(),
            color: "bg-gray-700".to_string(),
            icon: "⚙️".to_string(),
            category: "General".to_string(),
            web_augmentation: false,
            default_width: None,
            default_height: None,
        }
    }

    /// Create a definition for a built-in behavior
    pub fn built_in(
        name: impl Into<String>,
        description: impl Into<String>,
        tag: BuiltInKind,
    ) -> Self {
        Self::new(name, description, NodeKind::built_in(tag))
    }

    /// Create a definition for a templated behavior
    pub fn templated(
        name: impl Into<String>,
        description: impl Into<String>,
        spec: TemplateSpec,
    ) -> Self {
        Self::new(name, description, NodeKind::templated(spec))
    }

    /// Append an input port
    pub fn with_input(mut self, port: PortSpec) -> Self {
        self.inputs.push(port);
        self
    }

    /// Append an output port
    pub fn with_output(mut self, port: PortSpec) -> Self {
        self.outputs.push(port);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_web_augmentation(mut self) -> Self {
        self.web_augmentation = true;
        self
    }

    pub fn with_default_width(mut self, width: f64) -> Self {
        self.default_width = Some(width);
        self
    }

    pub fn with_default_height(mut self, height: f64) -> Self {
        self.default_height = Some(height);
        self
    }
}

/// Link-time registration of a node definition.
///
/// The field is a const function pointer that builds the definition at
/// runtime, so submissions stay allocation-free at link time.
///
/// # Example
///
/// ```ignore
/// inventory::submit!(canvas_engine::DefinitionFn(my_node::definition));
/// ```
pub struct DefinitionFn(pub fn() -> NodeDefinition);

inventory::collect!(DefinitionFn);
