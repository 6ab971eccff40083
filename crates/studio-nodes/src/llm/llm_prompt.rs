//! LLM Prompt
//!
//! Forwards a prompt to the configured text generation service and emits
//! the reply. A wired prompt takes precedence over text typed into the
//! node body; falls back to the body when the wire carries nothing.

use canvas_engine::{BuiltInKind, DataKind, DefinitionFn, NodeDefinition, PortSpec};

/// Port ID for the incoming prompt
pub const PORT_PROMPT_IN: &str = "prompt_in";
/// Port ID for the reply
pub const PORT_RESPONSE_OUT: &str = "response_out";

pub fn definition() -> NodeDefinition {
    NodeDefinition::built_in(
        "LLM Prompt",
        "Sends a prompt to the configured model and outputs its text response.",
        BuiltInKind::LlmPrompt,
    )
    .with_input(PortSpec::new(PORT_PROMPT_IN, "Prompt", DataKind::Text))
    .with_output(PortSpec::new(PORT_RESPONSE_OUT, "Response", DataKind::Text))
    .with_color("bg-purple-600")
    .with_icon("✨")
    .with_category("AI / LLM")
}

inventory::submit!(DefinitionFn(definition));
