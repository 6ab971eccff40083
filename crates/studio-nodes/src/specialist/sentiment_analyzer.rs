//! Sentiment Analyzer

use canvas_engine::{DataKind, DefinitionFn, NodeDefinition, PortSpec, TemplateSpec};

pub const PORT_TEXT_TO_ANALYZE_IN: &str = "text_to_analyze_in";
pub const PORT_SENTIMENT_OUT: &str = "sentiment_out";
pub const PORT_SENTIMENT_DETAILS_OUT: &str = "sentiment_details_out";

const TEMPLATE: &str = r#"You are "Sentiment Analyzer".
Text: "{text_to_analyze_in}"
Analyze the sentiment. Return a JSON object with two keys:
"sentiment_out": A string like "Positive", "Negative", or "Neutral".
"sentiment_details_out": A JSON object like {"label": "Positive", "score": 0.95}.
Provide ONLY the JSON response with keys 'sentiment_out' and 'sentiment_details_out'."#;

pub fn definition() -> NodeDefinition {
    NodeDefinition::templated(
        "Sentiment Analyzer",
        "Analyzes input text and determines its sentiment (e.g., positive, negative, neutral) and optionally a confidence score.",
        TemplateSpec::new(TEMPLATE),
    )
    .with_input(
        PortSpec::new(PORT_TEXT_TO_ANALYZE_IN, "Text to Analyze", DataKind::Text)
            .with_example(serde_json::json!("I love this new product! It's amazing.")),
    )
    .with_output(PortSpec::new(PORT_SENTIMENT_OUT, "Sentiment", DataKind::Text))
    .with_output(PortSpec::new(
        PORT_SENTIMENT_DETAILS_OUT,
        "Sentiment Details (JSON)",
        DataKind::Json,
    ))
    .with_color("bg-green-500")
    .with_icon("😊")
    .with_category("Text Analysis")
}

inventory::submit!(DefinitionFn(definition));
