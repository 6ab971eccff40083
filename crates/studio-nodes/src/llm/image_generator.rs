//! Image Generator
//!
//! Text-to-image generation. The optional model-identifier input selects a
//! local model; when it carries a real file name the request is routed to
//! the local image endpoint with that identifier.

use canvas_engine::{BuiltInKind, DataKind, DefinitionFn, NodeDefinition, PortSpec};

pub const PORT_PROMPT_IN: &str = "prompt_in";
/// Optional local model identifier, fed by a model file selector
pub const PORT_LOCAL_MODEL_IDENTIFIER_IN: &str = "local_model_identifier_in";
pub const PORT_IMAGE_OUT: &str = "image_out";

pub fn definition() -> NodeDefinition {
    NodeDefinition::built_in(
        "Image Generator",
        "Generates an image. For local models, connect a \"Local Model File Selector\".",
        BuiltInKind::ImageGenerator,
    )
    .with_input(PortSpec::new(PORT_PROMPT_IN, "Prompt", DataKind::Text))
    .with_input(
        PortSpec::new(
            PORT_LOCAL_MODEL_IDENTIFIER_IN,
            "Local Model ID",
            DataKind::Text,
        )
        .with_example(serde_json::json!("your_model.safetensors")),
    )
    .with_output(PortSpec::new(PORT_IMAGE_OUT, "Image", DataKind::Image))
    .with_color("bg-teal-600")
    .with_icon("🖼️")
    .with_category("AI / LLM")
}

inventory::submit!(DefinitionFn(definition));
