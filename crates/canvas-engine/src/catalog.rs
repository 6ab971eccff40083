//! Node catalog: registered definitions and instance creation
//!
//! The catalog maps type names to definitions and turns a definition into
//! a placed `NodeData` instance. It replaces scattered per-type placement
//! logic with one factory that owns id generation, sizing fallbacks, and
//! data-map seeding.
//!
//! # Composability
//!
//! Catalogs can be composed by merging:
//! ```ignore
//! let mut catalog = NodeCatalog::with_builtins();
//! catalog.merge(runtime_defined); // Add agents defined at runtime
//! ```

use std::collections::HashMap;

use uuid::Uuid;

use crate::definition::{DefinitionFn, NodeDefinition};
use crate::error::{CanvasError, Result};
use crate::types::{
    BuiltInKind, NodeData, NodeStatus, Port, PortRole, DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH,
    UI_PROMPT_KEY,
};

/// Registry of node definitions keyed by type name
pub struct NodeCatalog {
    entries: HashMap<String, NodeDefinition>,
}

impl NodeCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Create a catalog seeded with every definition submitted via
    /// `inventory` by linked crates
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for registration in inventory::iter::<DefinitionFn> {
            catalog.register((registration.0)());
        }
        catalog
    }

    /// Register a definition, replacing any entry with the same name
    pub fn register(&mut self, definition: NodeDefinition) {
        self.entries.insert(definition.name.clone(), definition);
    }

    /// Get a definition by type name
    pub fn get(&self, type_name: &str) -> Option<&NodeDefinition> {
        self.entries.get(type_name)
    }

    /// Check if a type name is registered
    pub fn has_type(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    /// All registered definitions, ordered by name
    pub fn all(&self) -> Vec<&NodeDefinition> {
        let mut definitions: Vec<&NodeDefinition> = self.entries.values().collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// All registered type names, ordered
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Definitions grouped by palette category, ordered by name within
    /// each group
    pub fn by_category(&self) -> HashMap<&str, Vec<&NodeDefinition>> {
        let mut grouped: HashMap<&str, Vec<&NodeDefinition>> = HashMap::new();
        for definition in self.all() {
            grouped
                .entry(definition.category.as_str())
                .or_default()
                .push(definition);
        }
        grouped
    }

    /// Case-insensitive search over names and descriptions
    pub fn search(&self, query: &str) -> Vec<&NodeDefinition> {
        let needle = query.to_lowercase();
        self.all()
            .into_iter()
            .filter(|d| {
                d.name.to_lowercase().contains(&needle)
                    || d.description.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Merge another catalog into this one
    ///
    /// Entries from `other` override entries in `self` with the same name.
    pub fn merge(&mut self, other: NodeCatalog) {
        self.entries.extend(other.entries);
    }

    /// Create a node instance of a registered type at a world position
    pub fn instantiate(&self, type_name: &str, x: f64, y: f64) -> Result<NodeData> {
        let definition = self
            .get(type_name)
            .ok_or_else(|| CanvasError::UnknownNodeType(type_name.to_string()))?;
        Ok(instantiate_definition(definition, x, y))
    }
}

impl Default for NodeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a fresh `NodeData` instance from a definition.
///
/// The id is the type name with whitespace collapsed to underscores plus a
/// unique suffix. Sizing falls back from the definition's overrides to the
/// kind's default height. The data map is seeded so that source-like nodes
/// have defined values from the moment they are placed:
/// - every input's example value, when declared
/// - text inputs: first output defined as the empty string
/// - prompt kinds: an empty body prompt (nothing is wired in yet)
/// - model file selectors: first output defined as `"None"`
/// - prompt assemblers: every part defined (example or empty string)
pub fn instantiate_definition(definition: &NodeDefinition, x: f64, y: f64) -> NodeData {
    let sanitized: String = definition
        .name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    let id = format!("{}-{}", sanitized, Uuid::new_v4());

    let build_ports = |specs: &[crate::definition::PortSpec], role: PortRole| {
        specs
            .iter()
            .map(|spec| Port {
                id: spec.id.clone(),
                name: spec.name.clone(),
                role,
                data_kind: spec.data_kind,
                example_value: spec.example_value.clone(),
            })
            .collect::<Vec<_>>()
    };

    let inputs = build_ports(&definition.inputs, PortRole::Input);
    let outputs = build_ports(&definition.outputs, PortRole::Output);

    let height = definition.default_height.unwrap_or_else(|| {
        definition
            .kind
            .built_in_tag()
            .map(|tag| tag.default_height())
            .unwrap_or(DEFAULT_NODE_HEIGHT)
    });

    let mut data = HashMap::new();
    for input in &definition.inputs {
        if let Some(example) = &input.example_value {
            data.insert(input.id.clone(), example.clone());
        }
    }
    match definition.kind.built_in_tag() {
        Some(BuiltInKind::TextInput) => {
            if let Some(output) = outputs.first() {
                data.insert(output.id.clone(), serde_json::json!(""));
            }
        }
        Some(BuiltInKind::LlmPrompt) | Some(BuiltInKind::LocalLlmPrompt) => {
            let has_prompt_in = inputs.iter().any(|p| p.id == "prompt_in");
            if has_prompt_in && !data.contains_key("prompt_in") {
                data.insert(UI_PROMPT_KEY.to_string(), serde_json::json!(""));
            }
        }
        Some(BuiltInKind::ModelFileSelector) => {
            if let Some(output) = outputs.first() {
                data.insert(output.id.clone(), serde_json::json!("None"));
            }
        }
        Some(BuiltInKind::PromptAssembler) => {
            for input in &definition.inputs {
                let seed = input
                    .example_value
                    .clone()
                    .unwrap_or_else(|| serde_json::json!(""));
                data.insert(input.id.clone(), seed);
            }
        }
        _ => {}
    }

    let web_augmentation = match &definition.kind {
        crate::types::NodeKind::Templated { spec } => spec.web_augmentation,
        crate::types::NodeKind::BuiltIn { .. } => definition.web_augmentation,
    };

    NodeData {
        id,
        kind: definition.kind.clone(),
        type_name: definition.name.clone(),
        name: definition.name.clone(),
        x,
        y,
        width: definition.default_width.unwrap_or(DEFAULT_NODE_WIDTH),
        height,
        inputs,
        outputs,
        data,
        web_augmentation,
        status: NodeStatus::Idle,
        error: None,
        execution_time: None,
        color: definition.color.clone(),
        icon: definition.icon.clone(),
        category: definition.category.clone(),
    }
}
