//! Local LLM Prompt
//!
//! Same contract as the hosted prompt node, but the request always goes to
//! the local runtime and web augmentation is never applied.

use canvas_engine::{BuiltInKind, DataKind, DefinitionFn, NodeDefinition, PortSpec};

pub const PORT_PROMPT_IN: &str = "prompt_in";
pub const PORT_RESPONSE_OUT: &str = "response_out";

pub fn definition() -> NodeDefinition {
    NodeDefinition::built_in(
        "Local LLM Prompt",
        "Sends a prompt to the configured local LLM (LM Studio/Ollama) and outputs its text response.",
        BuiltInKind::LocalLlmPrompt,
    )
    .with_input(PortSpec::new(PORT_PROMPT_IN, "Prompt", DataKind::Text))
    .with_output(PortSpec::new(PORT_RESPONSE_OUT, "Response", DataKind::Text))
    .with_color("bg-orange-600")
    .with_icon("🧠")
    .with_category("AI / LLM")
}

inventory::submit!(DefinitionFn(definition));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_shape() {
        let def = definition();
        assert_eq!(def.kind.built_in_tag(), Some(BuiltInKind::LocalLlmPrompt));
        assert_eq!(def.category, "AI / LLM");
    }
}
