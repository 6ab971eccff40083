//! Display Text

use canvas_engine::{BuiltInKind, DataKind, DefinitionFn, NodeDefinition, PortSpec};

pub const PORT_TEXT_IN: &str = "text_in";

pub fn definition() -> NodeDefinition {
    NodeDefinition::built_in(
        "Display Text",
        "Displays input text content.",
        BuiltInKind::DisplayText,
    )
    .with_input(PortSpec::new(PORT_TEXT_IN, "Text", DataKind::Text))
    .with_color("bg-slate-500")
    .with_icon("📄")
    .with_category("Display")
}

inventory::submit!(DefinitionFn(definition));
