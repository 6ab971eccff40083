//! Sketchpad
//!
//! A freehand drawing surface embedded in the node body. The only kind
//! with an exclusive interaction surface: while a sketch is in progress it
//! holds the canvas drawing lock, which suspends panning, zooming, and the
//! execution of other nodes. Committing a stroke writes the rendered
//! image under the output port id; execution itself is a no-op.

use canvas_engine::{BuiltInKind, DataKind, DefinitionFn, NodeDefinition, PortSpec};

/// Port ID for the committed sketch image (data URI)
pub const PORT_SKETCH_IMAGE_OUT: &str = "sketch_image_out";

pub fn definition() -> NodeDefinition {
    NodeDefinition::built_in(
        "Sketchpad",
        "A canvas for freehand drawing or sketching.",
        BuiltInKind::Sketchpad,
    )
    .with_output(PortSpec::new(
        PORT_SKETCH_IMAGE_OUT,
        "Sketch Output",
        DataKind::Image,
    ))
    .with_color("bg-stone-500")
    .with_icon("✏️")
    .with_category("Creative")
}

inventory::submit!(DefinitionFn(definition));
