//! Prompt Refiner

use canvas_engine::{DataKind, DefinitionFn, NodeDefinition, PortSpec, TemplateSpec};

pub const PORT_ORIGINAL_PROMPT_IN: &str = "original_prompt_in";
pub const PORT_REFINEMENT_GOAL_IN: &str = "refinement_goal_in";
pub const PORT_REFINED_PROMPT_OUT: &str = "refined_prompt_out";

const TEMPLATE: &str = r#"You are the "Prompt Refiner".
Original Prompt: "{original_prompt_in}"
Refinement Goal: "{refinement_goal_in}"
Refine the original prompt based on the goal. If no goal, improve for general clarity and effectiveness.
Output ONLY the refined prompt for 'refined_prompt_out'."#;

pub fn definition() -> NodeDefinition {
    NodeDefinition::templated(
        "Prompt Refiner",
        "Takes a user's basic prompt and refines it to be more effective for LLMs, adding detail, clarity, or specific instructions.",
        TemplateSpec::new(TEMPLATE),
    )
    .with_input(
        PortSpec::new(PORT_ORIGINAL_PROMPT_IN, "Original Prompt", DataKind::Text)
            .with_example(serde_json::json!("write a story")),
    )
    .with_input(
        PortSpec::new(
            PORT_REFINEMENT_GOAL_IN,
            "Refinement Goal (Optional)",
            DataKind::Text,
        )
        .with_example(serde_json::json!("make it a sci-fi story for kids")),
    )
    .with_output(PortSpec::new(
        PORT_REFINED_PROMPT_OUT,
        "Refined Prompt",
        DataKind::Text,
    ))
    .with_color("bg-pink-500")
    .with_icon("🔍")
    .with_category("Utility")
}

inventory::submit!(DefinitionFn(definition));
