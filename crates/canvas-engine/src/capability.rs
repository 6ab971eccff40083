//! Interaction capability registry
//!
//! One mapping from node kind to interaction profile, consulted wherever
//! behavior depends on what a node's body surface is. Lock acquisition asks
//! whether a surface is exclusive; the execution gate asks the same question
//! to exempt the lock holder's own kind. Nothing else in the engine is
//! allowed to special-case node kinds by name.

use serde::{Deserialize, Serialize};

use crate::types::{BuiltInKind, NodeKind};

/// What a node renders between its header and footer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodySurface {
    /// Editable plain value (text input)
    PlainValueEditor,
    /// Editable prompt box (LLM and image generation kinds)
    PromptBox,
    /// Editable list of prompt parts
    PartsList,
    /// Read-only image view
    ImageView,
    /// Read-only data view
    DataView,
    /// Freehand drawing surface
    SketchSurface,
    /// Local file picker
    FilePicker,
    /// No body surface
    None,
}

impl BodySurface {
    /// Exclusive surfaces capture all pointer input while active. Only the
    /// sketch surface qualifies: every other surface is a discrete widget
    /// the canvas can share input with.
    pub fn is_exclusive(&self) -> bool {
        matches!(self, BodySurface::SketchSurface)
    }
}

/// How a node's body participates in canvas interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionProfile {
    pub surface: BodySurface,
}

impl InteractionProfile {
    /// Whether this profile's surface may hold the canvas-wide drawing lock
    pub fn is_exclusive(&self) -> bool {
        self.surface.is_exclusive()
    }
}

/// Look up the interaction profile for a node kind
pub fn profile_for(kind: &NodeKind) -> InteractionProfile {
    let surface = match kind {
        NodeKind::BuiltIn { tag } => match tag {
            BuiltInKind::TextInput => BodySurface::PlainValueEditor,
            BuiltInKind::LlmPrompt
            | BuiltInKind::LocalLlmPrompt
            | BuiltInKind::ImageGenerator => BodySurface::PromptBox,
            BuiltInKind::PromptAssembler => BodySurface::PartsList,
            BuiltInKind::DisplayImage => BodySurface::ImageView,
            BuiltInKind::DisplayData | BuiltInKind::DisplayText => BodySurface::DataView,
            BuiltInKind::Sketchpad => BodySurface::SketchSurface,
            BuiltInKind::ModelFileSelector => BodySurface::FilePicker,
        },
        // Runtime-defined kinds show their last result; they never own an
        // exclusive surface
        NodeKind::Templated { .. } => BodySurface::DataView,
    };
    InteractionProfile { surface }
}

/// Whether a kind's surface captures input exclusively while active
pub fn has_exclusive_surface(kind: &NodeKind) -> bool {
    profile_for(kind).is_exclusive()
}
