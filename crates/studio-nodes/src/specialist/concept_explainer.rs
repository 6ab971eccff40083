//! Concept Explainer
//!
//! The one shipped specialist with web augmentation enabled, so current
//! information can flow into explanations.

use canvas_engine::{DataKind, DefinitionFn, NodeDefinition, PortSpec, TemplateSpec};

pub const PORT_CONCEPT_IN: &str = "concept_in";
pub const PORT_EXPLANATION_OUT: &str = "explanation_out";

const TEMPLATE: &str = r#"You are a Concept Explainer.
Concept/Term: "{concept_in}"
Explain this concept in simple, clear language, suitable for someone unfamiliar with it. Use an analogy if it helps.
Output ONLY the explanation for 'explanation_out'."#;

pub fn definition() -> NodeDefinition {
    NodeDefinition::templated(
        "Concept Explainer",
        "Explains a complex concept, term, or jargon in simple, easy-to-understand language.",
        TemplateSpec::new(TEMPLATE).with_web_augmentation(),
    )
    .with_input(
        PortSpec::new(PORT_CONCEPT_IN, "Concept/Term", DataKind::Text)
            .with_example(serde_json::json!("Quantum Entanglement")),
    )
    .with_output(PortSpec::new(
        PORT_EXPLANATION_OUT,
        "Explanation",
        DataKind::Text,
    ))
    .with_color("bg-sky-500")
    .with_icon("💡")
    .with_category("Educational")
}

inventory::submit!(DefinitionFn(definition));
