//! Prompt-driven node definition and failure diagnosis
//!
//! [`define_node_from_prompt`](HttpGenerationClient::define_node_from_prompt)
//! asks the active runtime to design a complete node from a plain-language
//! description: the instruction prompt pins a strict JSON contract, and the
//! reply is stripped of Markdown fences, parsed, validated, and repaired
//! into a [`NodeDefinition`] ready for catalog registration.
//! [`suggest_fix`](HttpGenerationClient::suggest_fix) is the companion
//! debugging assistant for failing templated nodes.

use canvas_engine::{DataKind, NodeDefinition, PortSpec, TemplateSpec};
use serde_json::{json, Value};

use crate::client::{snippet, HttpGenerationClient, CHAT_TEMPERATURE};
use crate::error::{InferenceError, Result};

/// Sampling temperature for definition requests
const DEFINE_TEMPERATURE: f64 = 0.5;

/// Category assigned to runtime-defined nodes
pub const DYNAMIC_NODE_CATEGORY: &str = "Custom Agents";

/// The JSON contract a definition reply must follow
const DEFINITION_CONTRACT: &str = r#"You are an AI assistant that helps define new functional nodes for a visual workflow application called Easel.
Based on the user's description, provide a JSON object defining the node.
The JSON object MUST have the following properties:
- "name": A concise, descriptive name for the node (e.g., "Text Summarizer", "Sentiment Analyzer"). Max 3 words.
- "description": A short explanation (max 15 words) of what the node does.
- "inputs": An array of input port objects. Each input port object must have:
    - "id": A unique snake_case string identifier for the port (e.g., "text_in", "image_data").
    - "name": A user-friendly name for the port (e.g., "Text to Summarize", "Input Image"). Max 3 words.
    - "dataType": The expected data type for this input. Supported types: 'text', 'image', 'number', 'boolean', 'json', 'any'.
    - "exampleValue": (Optional) A simple example value for this input, matching its dataType. For booleans, use true or false. For numbers, use a digit. For text, a short string. For JSON, a very simple valid JSON string like '{"key": "value"}'.
- "outputs": An array of output port objects. Each output port object must have:
    - "id": A unique snake_case string identifier for the port (e.g., "summary_out", "sentiment_score").
    - "name": A user-friendly name for the port (e.g., "Summary", "Sentiment"). Max 3 words.
    - "dataType": The data type of the output from this port.
- "executionLogicPrompt": A template string that will be used as a prompt for an LLM when an instance of this node is executed. This prompt should clearly state the task to be performed.
    - Use placeholders like {input_port_id} for where input data should be injected. For example, if an input port has id "text_in", the placeholder should be "{text_in}".
    - **IMPORTANT FOR MULTIPLE OUTPUTS**: If the node you are defining has MORE THAN ONE output port in the "outputs" array, the 'executionLogicPrompt' you generate MUST instruct the runtime LLM to return its result as a single, valid JSON object. The keys of this JSON object MUST exactly match the "id" fields of the "outputs" you define, and the values should be the corresponding data for each output port.
      Example for multiple outputs: If outputs are [{"id": "text_data", "name": "Text", "dataType":"text"}, {"id": "number_data", "name":"Count", "dataType":"number"}], the executionLogicPrompt should end with something like: "Provide your response as a JSON object with keys 'text_data' and 'number_data'."
    - If the node has only ONE output port, the LLM can return plain text, which will be assigned to that single output.
- "color": A Tailwind CSS background color class (e.g., "bg-sky-600", "bg-amber-500"). Choose a color that fits the node's function.
- "icon": A single emoji character to represent the node (e.g., "📄", "📊").
- "requiresWebSearch": (Optional) A boolean (true/false). Set to true if the node's primary function involves fetching or referencing current information from the web (e.g., "Current Weather Reporter", "Latest News Summarizer"). Defaults to false if omitted.

Constraints:
- Node names, port names should be concise.
- Port IDs must be unique within their respective 'inputs' or 'outputs' array for a given node definition.
- Ensure 'executionLogicPrompt' correctly references the 'id' fields of the 'inputs'."#;

fn definition_prompt(description: &str) -> String {
    format!(
        "{DEFINITION_CONTRACT}\n\nUser's node description: \"{description}\"\nProvide ONLY the JSON object in your response. Ensure the JSON is valid."
    )
}

const SUGGESTION_PREAMBLE: &str = r#"You are an AI debugging assistant for a visual workflow application.
A custom-defined node in the workflow failed during execution.
The node's behavior is determined by an "Execution Logic Prompt" which is sent to an LLM.
You need to analyze the provided Execution Logic Prompt, the input data the node received, and the error message it produced.
Based on this, provide a concise suggestion (1-3 sentences, max 50 words) to the user on:
1.  A possible reason for the error.
2.  How they might adjust their "Execution Logic Prompt" to fix it.
3.  Or, if the input data seems to be the issue, suggest checking the inputs.

Do not try to rewrite the entire prompt. Be brief and helpful."#;

fn suggestion_prompt(template: &str, inputs: &Value, error: &str) -> String {
    let input_json =
        serde_json::to_string_pretty(inputs).unwrap_or_else(|_| "{}".to_string());
    format!(
        "{SUGGESTION_PREAMBLE}\n\nExecution Logic Prompt:\n```\n{template}\n```\n\nInput Data Received by Node:\n```json\n{input_json}\n```\n\nError Message:\n```\n{error}\n```\n\nProvide your diagnostic suggestion:"
    )
}

impl HttpGenerationClient {
    /// Ask the active runtime to design a node from a plain-language
    /// description.
    ///
    /// The reply must be a single JSON object following the definition
    /// contract. It is validated, repaired where models commonly slip
    /// (mistyped example values, missing port ids), and returned as a
    /// templated [`NodeDefinition`] under the "Custom Agents" category.
    pub async fn define_node_from_prompt(&self, description: &str) -> Result<NodeDefinition> {
        let label = self.config().snapshot().active_runtime.label();
        let response = self
            .chat(&definition_prompt(description), DEFINE_TEMPERATURE)
            .await;
        if let Some(error) = response.error {
            return Err(InferenceError::Generation(error));
        }
        parse_definition_reply(&response.text, label)
    }

    /// Compose the diagnostic prompt for a failed templated node and
    /// return the model's short suggestion.
    pub async fn suggest_fix(
        &self,
        template: &str,
        inputs: &Value,
        error: &str,
    ) -> Result<String> {
        let label = self.config().snapshot().active_runtime.label();
        let response = self
            .chat(&suggestion_prompt(template, inputs, error), CHAT_TEMPERATURE)
            .await;
        if let Some(error) = response.error {
            return Err(InferenceError::Generation(error));
        }
        if response.text.is_empty() {
            return Ok(format!("{label} provided no suggestion."));
        }
        Ok(response.text)
    }
}

/// Which side of the node a parsed port belongs to
#[derive(Clone, Copy, PartialEq)]
enum Side {
    Input,
    Output,
}

impl Side {
    fn word(self) -> &'static str {
        match self {
            Side::Input => "input",
            Side::Output => "output",
        }
    }
}

/// Strip a wrapping Markdown code fence, with an optional language tag on
/// the opening line.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };
    let inner = match inner.split_once('\n') {
        Some((first, tail)) if first.trim().chars().all(|c| c.is_ascii_alphanumeric()) => tail,
        _ => inner,
    };
    inner.trim()
}

fn missing_fields_error(parsed: &Value, label: &str) -> InferenceError {
    InferenceError::InvalidDefinition(format!(
        "JSON from {label} is missing required fields or is not structured as a node \
         definition. Received: {}",
        snippet(&parsed.to_string(), 300)
    ))
}

/// Parse and validate a definition reply into a catalog-ready definition.
fn parse_definition_reply(reply: &str, label: &str) -> Result<NodeDefinition> {
    let clean = strip_code_fence(reply);
    let parsed: Value = serde_json::from_str(clean).map_err(|err| {
        InferenceError::InvalidDefinition(format!(
            "Error parsing JSON from {label} while defining a node: {err}. \
             Raw response snippet: {}",
            snippet(clean, 500)
        ))
    })?;

    let name = parsed["name"].as_str().unwrap_or_default();
    let description = parsed["description"].as_str().unwrap_or_default();
    let template = parsed["executionLogicPrompt"].as_str().unwrap_or_default();
    let color = parsed["color"].as_str().unwrap_or_default();
    let icon = parsed["icon"].as_str().unwrap_or_default();
    let (Some(inputs), Some(outputs)) =
        (parsed["inputs"].as_array(), parsed["outputs"].as_array())
    else {
        return Err(missing_fields_error(&parsed, label));
    };
    if name.is_empty()
        || description.is_empty()
        || template.is_empty()
        || color.is_empty()
        || icon.is_empty()
    {
        return Err(missing_fields_error(&parsed, label));
    }

    let mut spec = TemplateSpec::new(template);
    if parsed["requiresWebSearch"].as_bool().unwrap_or(false) {
        spec = spec.with_web_augmentation();
    }

    let mut definition = NodeDefinition::templated(name, description, spec)
        .with_color(color)
        .with_icon(icon)
        .with_category(DYNAMIC_NODE_CATEGORY);

    for (index, raw) in inputs.iter().enumerate() {
        definition = definition.with_input(parse_port(raw, Side::Input, index, name)?);
    }
    for (index, raw) in outputs.iter().enumerate() {
        definition = definition.with_output(parse_port(raw, Side::Output, index, name)?);
    }

    Ok(definition)
}

fn parse_port(raw: &Value, side: Side, index: usize, node_name: &str) -> Result<PortSpec> {
    let Some(port_name) = raw["name"].as_str().filter(|name| !name.is_empty()) else {
        return Err(InferenceError::InvalidDefinition(format!(
            "{} port {index} of \"{node_name}\" has no name. Received: {}",
            side.word(),
            snippet(&raw.to_string(), 300)
        )));
    };
    let id = match raw["id"].as_str().filter(|id| !id.is_empty()) {
        Some(id) => id.to_string(),
        None => format!(
            "{}-{}-{index}",
            side.word(),
            port_name.to_lowercase().replace(' ', "_")
        ),
    };
    let data_kind = parse_data_kind(raw["dataType"].as_str(), &id, node_name);

    let mut example = raw.get("exampleValue").cloned();
    if side == Side::Input {
        example = repair_example(example, data_kind, &id, node_name);
    }

    let mut port = PortSpec::new(id, port_name, data_kind);
    if let Some(example) = example {
        port = port.with_example(example);
    }
    Ok(port)
}

fn parse_data_kind(raw: Option<&str>, port_id: &str, node_name: &str) -> DataKind {
    match raw {
        Some("text") => DataKind::Text,
        Some("image") => DataKind::Image,
        Some("number") => DataKind::Number,
        Some("boolean") => DataKind::Boolean,
        Some("json") => DataKind::Json,
        Some("any") => DataKind::Any,
        Some(other) => {
            log::warn!("unknown dataType '{other}' for {port_id} in {node_name}; treating as any");
            DataKind::Any
        }
        None => {
            log::warn!("missing dataType for {port_id} in {node_name}; treating as any");
            DataKind::Any
        }
    }
}

/// Input example values that disagree with their declared kind are
/// repaired rather than rejected.
fn repair_example(
    example: Option<Value>,
    kind: DataKind,
    port_id: &str,
    node_name: &str,
) -> Option<Value> {
    let example = example?;
    match kind {
        DataKind::Number if !example.is_number() => {
            log::warn!(
                "fixing exampleValue for {port_id} in {node_name}: expected number, \
                 got {example}; using 0"
            );
            Some(json!(0))
        }
        DataKind::Boolean if !example.is_boolean() => {
            log::warn!(
                "fixing exampleValue for {port_id} in {node_name}: expected boolean, \
                 got {example}; using false"
            );
            Some(json!(false))
        }
        DataKind::Json => {
            let valid = example.as_str().is_some_and(|raw| {
                let raw = raw.trim();
                (raw.starts_with('{') || raw.starts_with('['))
                    && serde_json::from_str::<Value>(raw).is_ok()
            });
            if valid {
                Some(example)
            } else {
                log::warn!(
                    "fixing exampleValue for {port_id} in {node_name}: expected a valid \
                     JSON string, got {example}; using '{{\"valid\":true}}'"
                );
                Some(Value::String("{\"valid\":true}".to_string()))
            }
        }
        _ => Some(example),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_engine::NodeKind;

    const FULL_REPLY: &str = r#"{
        "name": "Sentiment Scorer",
        "description": "Scores the sentiment of text.",
        "inputs": [
            { "id": "text_in", "name": "Text", "dataType": "text", "exampleValue": "great day" }
        ],
        "outputs": [
            { "id": "score_out", "name": "Score", "dataType": "number" }
        ],
        "executionLogicPrompt": "Score the sentiment of: {text_in}",
        "color": "bg-rose-600",
        "icon": "🎯",
        "requiresWebSearch": false
    }"#;

    #[test]
    fn test_parse_full_definition() {
        let def = parse_definition_reply(FULL_REPLY, "LM Studio").unwrap();
        assert_eq!(def.name, "Sentiment Scorer");
        assert_eq!(def.category, "Custom Agents");
        assert_eq!(def.color, "bg-rose-600");
        assert_eq!(def.icon, "🎯");
        assert_eq!(def.inputs.len(), 1);
        assert_eq!(def.inputs[0].id, "text_in");
        assert_eq!(def.inputs[0].example_value, Some(json!("great day")));
        assert_eq!(def.outputs[0].data_kind, DataKind::Number);
        match &def.kind {
            NodeKind::Templated { spec } => {
                assert_eq!(spec.template, "Score the sentiment of: {text_in}");
                assert!(!spec.web_augmentation);
                assert!(!spec.adapts_to_target);
            }
            NodeKind::BuiltIn { .. } => panic!("expected a templated kind"),
        }
    }

    #[test]
    fn test_parse_definition_strips_code_fence() {
        let fenced = format!("```json\n{FULL_REPLY}\n```");
        let def = parse_definition_reply(&fenced, "Ollama").unwrap();
        assert_eq!(def.name, "Sentiment Scorer");
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_missing_required_fields_is_an_error() {
        let reply =
            r#"{ "name": "Half Done", "description": "missing the rest", "inputs": [], "outputs": [] }"#;
        let error = parse_definition_reply(reply, "Ollama").unwrap_err();
        let message = error.to_string();
        assert!(message.contains("missing required fields"));
        assert!(message.contains("Half Done"));
    }

    #[test]
    fn test_unparseable_reply_carries_snippet() {
        let error = parse_definition_reply("not json at all", "LM Studio").unwrap_err();
        let message = error.to_string();
        assert!(message.contains("Error parsing JSON from LM Studio"));
        assert!(message.contains("not json at all"));
    }

    #[test]
    fn test_port_ids_autogenerate_when_absent() {
        let reply = r#"{
            "name": "Echo",
            "description": "Echoes input.",
            "inputs": [{ "name": "Source Text", "dataType": "text" }],
            "outputs": [{ "name": "Echoed", "dataType": "text" }],
            "executionLogicPrompt": "Echo: {input-source_text-0}",
            "color": "bg-zinc-600",
            "icon": "🔁"
        }"#;
        let def = parse_definition_reply(reply, "Ollama").unwrap();
        assert_eq!(def.inputs[0].id, "input-source_text-0");
        assert_eq!(def.outputs[0].id, "output-echoed-0");
    }

    #[test]
    fn test_input_examples_repaired_to_declared_kind() {
        let reply = r#"{
            "name": "Threshold",
            "description": "Applies a threshold.",
            "inputs": [
                { "id": "limit_in", "name": "Limit", "dataType": "number", "exampleValue": "ten" },
                { "id": "strict_in", "name": "Strict", "dataType": "boolean", "exampleValue": "yes" },
                { "id": "rules_in", "name": "Rules", "dataType": "json", "exampleValue": "nonsense" }
            ],
            "outputs": [{ "id": "result_out", "name": "Result", "dataType": "text" }],
            "executionLogicPrompt": "Apply {limit_in} strictly={strict_in} rules={rules_in}",
            "color": "bg-cyan-700",
            "icon": "🚦"
        }"#;
        let def = parse_definition_reply(reply, "LM Studio").unwrap();
        assert_eq!(def.inputs[0].example_value, Some(json!(0)));
        assert_eq!(def.inputs[1].example_value, Some(json!(false)));
        assert_eq!(
            def.inputs[2].example_value,
            Some(json!("{\"valid\":true}"))
        );
    }

    #[test]
    fn test_valid_json_string_example_survives() {
        let reply = r#"{
            "name": "Rule Runner",
            "description": "Runs rules.",
            "inputs": [
                { "id": "rules_in", "name": "Rules", "dataType": "json", "exampleValue": "{\"threshold\": 5}" }
            ],
            "outputs": [{ "id": "verdict_out", "name": "Verdict", "dataType": "text" }],
            "executionLogicPrompt": "Apply rules {rules_in}",
            "color": "bg-emerald-700",
            "icon": "⚖️"
        }"#;
        let def = parse_definition_reply(reply, "Ollama").unwrap();
        assert_eq!(
            def.inputs[0].example_value,
            Some(json!("{\"threshold\": 5}"))
        );
    }

    #[test]
    fn test_output_examples_are_not_repaired() {
        let reply = r#"{
            "name": "Counter",
            "description": "Counts things.",
            "inputs": [{ "id": "items_in", "name": "Items", "dataType": "text" }],
            "outputs": [
                { "id": "count_out", "name": "Count", "dataType": "number", "exampleValue": "lots" }
            ],
            "executionLogicPrompt": "Count: {items_in}",
            "color": "bg-violet-600",
            "icon": "🧮"
        }"#;
        let def = parse_definition_reply(reply, "Ollama").unwrap();
        assert_eq!(def.outputs[0].example_value, Some(json!("lots")));
    }

    #[test]
    fn test_web_search_flag_lands_in_template_spec() {
        let reply = r#"{
            "name": "News Digest",
            "description": "Summarizes current news.",
            "inputs": [{ "id": "topic_in", "name": "Topic", "dataType": "text" }],
            "outputs": [{ "id": "digest_out", "name": "Digest", "dataType": "text" }],
            "executionLogicPrompt": "Summarize today's news about {topic_in}",
            "color": "bg-red-600",
            "icon": "📰",
            "requiresWebSearch": true
        }"#;
        let def = parse_definition_reply(reply, "LM Studio").unwrap();
        match &def.kind {
            NodeKind::Templated { spec } => assert!(spec.web_augmentation),
            NodeKind::BuiltIn { .. } => panic!("expected a templated kind"),
        }
    }

    #[test]
    fn test_unknown_data_type_falls_back_to_any() {
        let reply = r#"{
            "name": "Embedder",
            "description": "Embeds text.",
            "inputs": [{ "id": "text_in", "name": "Text", "dataType": "vector" }],
            "outputs": [{ "id": "vector_out", "name": "Vector", "dataType": "json" }],
            "executionLogicPrompt": "Embed {text_in}",
            "color": "bg-fuchsia-700",
            "icon": "📐"
        }"#;
        let def = parse_definition_reply(reply, "Ollama").unwrap();
        assert_eq!(def.inputs[0].data_kind, DataKind::Any);
    }

    #[test]
    fn test_definition_prompt_carries_description_and_contract() {
        let prompt = definition_prompt("counts words in text");
        assert!(prompt.contains("User's node description: \"counts words in text\""));
        assert!(prompt.contains("\"executionLogicPrompt\""));
        assert!(prompt.contains("IMPORTANT FOR MULTIPLE OUTPUTS"));
        assert!(prompt.ends_with("Provide ONLY the JSON object in your response. Ensure the JSON is valid."));
    }

    #[test]
    fn test_suggestion_prompt_embeds_all_three_sections() {
        let prompt = suggestion_prompt(
            "Summarize {text_in}",
            &json!({ "text_in": "abc" }),
            "model produced no output",
        );
        assert!(prompt.contains("Execution Logic Prompt:\n```\nSummarize {text_in}\n```"));
        assert!(prompt.contains("\"text_in\": \"abc\""));
        assert!(prompt.contains("Error Message:\n```\nmodel produced no output\n```"));
        assert!(prompt.ends_with("Provide your diagnostic suggestion:"));
    }
}
