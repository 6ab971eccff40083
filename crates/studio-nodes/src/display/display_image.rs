//! Display Image

use canvas_engine::{BuiltInKind, DataKind, DefinitionFn, NodeDefinition, PortSpec};

pub const PORT_IMAGE_IN: &str = "image_in";

pub fn definition() -> NodeDefinition {
    NodeDefinition::built_in(
        "Display Image",
        "Displays an input image.",
        BuiltInKind::DisplayImage,
    )
    .with_input(PortSpec::new(PORT_IMAGE_IN, "Image", DataKind::Image))
    .with_color("bg-lime-600")
    .with_icon("🏞️")
    .with_category("Display")
}

inventory::submit!(DefinitionFn(definition));
