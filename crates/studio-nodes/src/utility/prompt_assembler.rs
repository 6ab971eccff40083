//! Prompt Assembler
//!
//! Joins up to five inputs of any kind into one prompt string. Parts that
//! coerce to an empty string are dropped, the rest join with single
//! spaces; non-string values are serialized to compact JSON first.

use canvas_engine::{BuiltInKind, DataKind, DefinitionFn, NodeDefinition, PortSpec};

pub const PORT_PART_1: &str = "prompt_part_1";
pub const PORT_PART_2: &str = "prompt_part_2";
pub const PORT_PART_3: &str = "prompt_part_3";
pub const PORT_PART_4: &str = "prompt_part_4";
pub const PORT_PART_5: &str = "prompt_part_5";
pub const PORT_ASSEMBLED_PROMPT_OUT: &str = "assembled_prompt_out";

pub fn definition() -> NodeDefinition {
    NodeDefinition::built_in(
        "Prompt Assembler",
        "Combines up to 5 inputs of any type into a single text prompt output, separated by spaces.",
        BuiltInKind::PromptAssembler,
    )
    .with_input(PortSpec::new(PORT_PART_1, "Part 1", DataKind::Any).with_example(serde_json::json!("This is ")))
    .with_input(PortSpec::new(PORT_PART_2, "Part 2", DataKind::Any).with_example(serde_json::json!("a multi-part ")))
    .with_input(PortSpec::new(PORT_PART_3, "Part 3", DataKind::Any).with_example(serde_json::json!("prompt ")))
    .with_input(PortSpec::new(PORT_PART_4, "Part 4", DataKind::Any).with_example(serde_json::json!("example.")))
    .with_input(PortSpec::new(PORT_PART_5, "Part 5", DataKind::Any).with_example(serde_json::json!("")))
    .with_output(PortSpec::new(
        PORT_ASSEMBLED_PROMPT_OUT,
        "Assembled Prompt",
        DataKind::Text,
    ))
    .with_color("bg-slate-600")
    .with_icon("🧩")
    .with_category("Utility")
}

inventory::submit!(DefinitionFn(definition));
