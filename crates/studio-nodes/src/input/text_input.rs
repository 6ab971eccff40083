//! Text Input
//!
//! The simplest value source: whatever the user types into the node body
//! is stored under the output port id and emitted on execution. No
//! upstream dependencies, never fails.

use canvas_engine::{BuiltInKind, DataKind, DefinitionFn, NodeDefinition, PortSpec};

/// Port ID for the emitted text
pub const PORT_TEXT_OUT: &str = "text_out";

pub fn definition() -> NodeDefinition {
    NodeDefinition::built_in(
        "Text Input",
        "Provides a text input field.",
        BuiltInKind::TextInput,
    )
    .with_output(PortSpec::new(PORT_TEXT_OUT, "Text", DataKind::Text))
    .with_color("bg-blue-600")
    .with_icon("📝")
    .with_category("Input")
}

inventory::submit!(DefinitionFn(definition));
