//! Per-kind execution strategies
//!
//! One function per node behavior, dispatched by pattern matching on the
//! node's kind. A strategy reads the node's current data map (inputs were
//! propagated into it beforehand), calls a generation service if the kind
//! needs one, and returns either the outputs to commit or the error message
//! to record on the node. Strategies never touch the store and never panic
//! on malformed data; every failure becomes a message.

use std::collections::HashMap;

use serde_json::Value;

use crate::services::{ImageGenerationService, TextGenerationService};
use crate::types::{BuiltInKind, CanvasDocument, NodeData, NodeKind, TemplateSpec, UI_PROMPT_KEY};

/// Outputs to commit, or the error message to record
pub type StrategyResult = std::result::Result<HashMap<String, Value>, String>;

const NOT_EXECUTABLE: &str = "Node type is not executable or logic prompt is missing.";

/// Execute a node's behavior against its current data map.
///
/// The document is the state the node was scheduled under; the adapter
/// strategy reads its edges to discover what the node feeds into.
pub async fn execute(
    node: &NodeData,
    document: &CanvasDocument,
    text_service: &dyn TextGenerationService,
    image_service: &dyn ImageGenerationService,
) -> StrategyResult {
    match &node.kind {
        NodeKind::BuiltIn { tag } => match tag {
            BuiltInKind::TextInput => text_input(node),
            BuiltInKind::ModelFileSelector => model_file_selector(node),
            BuiltInKind::PromptAssembler => prompt_assembler(node),
            BuiltInKind::LlmPrompt => llm_prompt(node, text_service, true).await,
            BuiltInKind::LocalLlmPrompt => llm_prompt(node, text_service, false).await,
            BuiltInKind::ImageGenerator => image_generator(node, image_service).await,
            BuiltInKind::DisplayData
            | BuiltInKind::DisplayImage
            | BuiltInKind::DisplayText
            | BuiltInKind::Sketchpad => Ok(HashMap::new()),
        },
        NodeKind::Templated { spec } => {
            if spec.template.trim().is_empty() {
                Err(NOT_EXECUTABLE.to_string())
            } else if spec.adapts_to_target {
                adapter(node, spec, document, text_service).await
            } else {
                templated(node, spec, text_service).await
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Value coercion helpers
// ---------------------------------------------------------------------------

/// Truthiness as the data map uses it: absent, null, false, zero, and the
/// empty string all count as "no value here yet"
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a port value as template text: strings pass through verbatim,
/// anything else is its compact JSON form, and missing values are empty
fn value_to_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Resolve the effective prompt: a value wired into `prompt_in` wins over
/// the prompt typed into the node's body
fn resolve_prompt(node: &NodeData) -> String {
    for key in ["prompt_in", UI_PROMPT_KEY] {
        if let Some(value) = node.value(key) {
            if truthy(value) {
                return value_to_text(Some(value));
            }
        }
    }
    String::new()
}

/// Strip a Markdown code fence (with optional info string) from a model
/// reply, leaving the payload
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        if let Some(inner) = rest.strip_suffix("```") {
            let inner = match inner.split_once('\n') {
                Some((_info, payload)) => payload,
                None => inner.strip_prefix("json").unwrap_or(inner),
            };
            return inner.trim();
        }
    }
    trimmed
}

/// First hundred characters of a reply, for error context
fn snippet(text: &str) -> String {
    text.chars().take(100).collect()
}

// ---------------------------------------------------------------------------
// Built-in strategies
// ---------------------------------------------------------------------------

fn text_input(node: &NodeData) -> StrategyResult {
    let mut outputs = HashMap::new();
    if let Some(port_id) = node.first_output_id() {
        let value = node
            .value(port_id)
            .filter(|v| truthy(v))
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()));
        outputs.insert(port_id.to_string(), value);
    }
    Ok(outputs)
}

fn model_file_selector(node: &NodeData) -> StrategyResult {
    match node.first_output_id() {
        Some(port_id) => match node.value(port_id).filter(|v| truthy(v)) {
            Some(value) => {
                let mut outputs = HashMap::new();
                outputs.insert(port_id.to_string(), value.clone());
                Ok(outputs)
            }
            None => Err("No model file selected or output port missing.".to_string()),
        },
        None => Err("No model file selected or output port missing.".to_string()),
    }
}

/// Join the five parts into one prompt. Parts that render empty are
/// dropped entirely, so holes in the middle never produce doubled spaces.
fn prompt_assembler(node: &NodeData) -> StrategyResult {
    const PART_IDS: [&str; 5] = [
        "prompt_part_1",
        "prompt_part_2",
        "prompt_part_3",
        "prompt_part_4",
        "prompt_part_5",
    ];

    let assembled = PART_IDS
        .iter()
        .map(|id| value_to_text(node.value(id)))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut outputs = HashMap::new();
    if let Some(port_id) = node.first_output_id() {
        outputs.insert(port_id.to_string(), Value::String(assembled));
    }
    Ok(outputs)
}

async fn llm_prompt(
    node: &NodeData,
    text_service: &dyn TextGenerationService,
    may_augment: bool,
) -> StrategyResult {
    let prompt = resolve_prompt(node);
    if prompt.is_empty() {
        return Err("Prompt is empty.".to_string());
    }

    let web_augmentation = may_augment && node.web_augmentation;
    let response = text_service.generate_text(&prompt, web_augmentation).await;
    if let Some(error) = response.error {
        return Err(error);
    }

    let mut outputs = HashMap::new();
    if let Some(port_id) = node.first_output_id() {
        outputs.insert(port_id.to_string(), Value::String(response.text));
    }
    Ok(outputs)
}

async fn image_generator(
    node: &NodeData,
    image_service: &dyn ImageGenerationService,
) -> StrategyResult {
    let prompt = resolve_prompt(node);
    if prompt.is_empty() {
        return Err("Image prompt is empty.".to_string());
    }

    // "None" is the selector's placeholder for nothing chosen
    let identifier = node
        .text_value("local_model_identifier_in")
        .filter(|s| !s.is_empty() && *s != "None");

    let image_url = image_service.generate_image(&prompt, identifier).await;
    if image_url.starts_with("Error:") {
        return Err(image_url);
    }

    let mut outputs = HashMap::new();
    if let Some(port_id) = node.first_output_id() {
        outputs.insert(port_id.to_string(), Value::String(image_url));
    }
    Ok(outputs)
}

// ---------------------------------------------------------------------------
// Templated strategies
// ---------------------------------------------------------------------------

/// Standard templated execution: fill `{port_id}` placeholders for every
/// input, run the prompt, and map the reply onto the outputs. A single
/// output takes the raw reply; multiple outputs require the reply to be a
/// JSON object keyed by output port id.
async fn templated(
    node: &NodeData,
    spec: &TemplateSpec,
    text_service: &dyn TextGenerationService,
) -> StrategyResult {
    let mut filled = spec.template.clone();
    for input in &node.inputs {
        let placeholder = format!("{{{}}}", input.id);
        filled = filled.replace(&placeholder, &value_to_text(node.value(&input.id)));
    }

    let response = text_service
        .generate_text(&filled, node.web_augmentation)
        .await;
    if let Some(error) = response.error {
        return Err(error);
    }
    let text = response.text;

    if node.outputs.len() > 1 {
        let payload = strip_code_fence(&text);
        let parsed: Result<Value, _> = serde_json::from_str(payload);
        let message = match parsed {
            Ok(Value::Object(map)) => {
                return Ok(map.into_iter().collect());
            }
            Ok(_) => "LLM response not a JSON object.".to_string(),
            Err(e) => e.to_string(),
        };
        Err(format!(
            "Error parsing LLM JSON response for multiple outputs: {message}. Response: {}",
            snippet(&text)
        ))
    } else {
        let mut outputs = HashMap::new();
        if let Some(port_id) = node.first_output_id() {
            outputs.insert(port_id.to_string(), Value::String(text));
        }
        Ok(outputs)
    }
}

/// Type-adapter execution: besides the input payload, the template learns
/// what the adapter's output currently feeds into, so the model can convert
/// toward the consumer's declared kind. The reply must be a JSON object
/// carrying `output_data`.
async fn adapter(
    node: &NodeData,
    spec: &TemplateSpec,
    document: &CanvasDocument,
    text_service: &dyn TextGenerationService,
) -> StrategyResult {
    let input_text = node
        .inputs
        .first()
        .map(|port| value_to_text(node.value(&port.id)))
        .unwrap_or_default();

    let mut target_kind = "any".to_string();
    let mut target_port_name = "unknown".to_string();
    let mut target_node_name = "unknown".to_string();
    let mut target_node_type = "unknown".to_string();

    if let Some(output_id) = node.first_output_id() {
        let outgoing = document
            .outgoing_edges(&node.id)
            .find(|edge| edge.source_output_id == output_id);
        if let Some(edge) = outgoing {
            if let Some(target) = document.find_node(&edge.target_node_id) {
                if let Some(port) = target.input(&edge.target_input_id) {
                    target_kind = port.data_kind.as_str().to_string();
                    target_port_name = port.name.clone();
                    target_node_name = target.name.clone();
                    target_node_type = target.type_name.clone();
                }
            }
        }
    }

    let filled = spec
        .template
        .replace("{input_data_stringified}", &input_text)
        .replace("{target_data_type}", &target_kind)
        .replace("{target_port_name}", &target_port_name)
        .replace("{target_node_name}", &target_node_name)
        .replace("{target_node_type}", &target_node_type);

    let response = text_service
        .generate_text(&filled, node.web_augmentation)
        .await;
    if let Some(error) = response.error {
        return Err(error);
    }
    let text = response.text;

    let payload = strip_code_fence(&text);
    let parsed: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(e) => {
            return Err(format!(
                "Error parsing Adapter LLM response: {e}. Response: {}",
                snippet(&text)
            ));
        }
    };

    let output_data = match parsed.get("output_data") {
        Some(value) => value,
        None => return Err("Adapter response missing 'output_data'.".to_string()),
    };

    if let Some(error_value) = output_data.get("error").filter(|e| truthy(e)) {
        let input_type = output_data
            .get("original_input_type_detected")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        let requested = output_data
            .get("requested_target_type")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        return Err(format!(
            "Adapter Error: {}. Input type: {input_type}, Target type: {requested}",
            value_to_text(Some(error_value))
        ));
    }

    let mut outputs = HashMap::new();
    if let Some(port_id) = node.first_output_id() {
        outputs.insert(port_id.to_string(), output_data.clone());
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::instantiate_definition;
    use crate::definition::{NodeDefinition, PortSpec};
    use crate::services::TextResponse;
    use crate::types::DataKind;
    use async_trait::async_trait;
    use std::sync::Mutex;

    type TextReply = Box<dyn Fn(&str, bool) -> TextResponse + Send + Sync>;

    struct TestTextService {
        reply: TextReply,
        calls: Mutex<Vec<(String, bool)>>,
    }

    impl TestTextService {
        fn returning(text: &str) -> Self {
            let text = text.to_string();
            Self::with(move |_, _| TextResponse::ok(text.clone()))
        }

        fn with(reply: impl Fn(&str, bool) -> TextResponse + Send + Sync + 'static) -> Self {
            Self {
                reply: Box::new(reply),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, bool)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerationService for TestTextService {
        async fn generate_text(&self, prompt: &str, web_augmentation: bool) -> TextResponse {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), web_augmentation));
            (self.reply)(prompt, web_augmentation)
        }
    }

    struct TestImageService {
        reply: Box<dyn Fn(&str, Option<&str>) -> String + Send + Sync>,
        calls: Mutex<Vec<(String, Option<String>)>>,
    }

    impl TestImageService {
        fn with(reply: impl Fn(&str, Option<&str>) -> String + Send + Sync + 'static) -> Self {
            Self {
                reply: Box::new(reply),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, Option<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageGenerationService for TestImageService {
        async fn generate_image(&self, prompt: &str, model_identifier: Option<&str>) -> String {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), model_identifier.map(String::from)));
            (self.reply)(prompt, model_identifier)
        }
    }

    fn unused_text() -> TestTextService {
        TestTextService::with(|_, _| TextResponse::failed("text service should not be called"))
    }

    fn unused_image() -> TestImageService {
        TestImageService::with(|_, _| "Error: image service should not be called".to_string())
    }

    async fn run(node: &NodeData, text: &TestTextService, image: &TestImageService) -> StrategyResult {
        execute(node, &CanvasDocument::default(), text, image).await
    }

    fn make(definition: NodeDefinition) -> NodeData {
        instantiate_definition(&definition, 0.0, 0.0)
    }

    // -- built-ins ----------------------------------------------------------

    #[tokio::test]
    async fn test_text_input_emits_stored_text() {
        let mut node = make(
            NodeDefinition::built_in("Text Input", "", BuiltInKind::TextInput)
                .with_output(PortSpec::new("text_out", "Text", DataKind::Text)),
        );
        node.data
            .insert("text_out".to_string(), serde_json::json!("hello"));

        let outputs = run(&node, &unused_text(), &unused_image()).await.unwrap();
        assert_eq!(outputs["text_out"], serde_json::json!("hello"));
    }

    #[tokio::test]
    async fn test_text_input_defaults_to_empty() {
        let node = make(
            NodeDefinition::built_in("Text Input", "", BuiltInKind::TextInput)
                .with_output(PortSpec::new("text_out", "Text", DataKind::Text)),
        );
        let outputs = run(&node, &unused_text(), &unused_image()).await.unwrap();
        assert_eq!(outputs["text_out"], serde_json::json!(""));
    }

    #[tokio::test]
    async fn test_model_selector_requires_selection() {
        let mut node = make(
            NodeDefinition::built_in("Model File Selector", "", BuiltInKind::ModelFileSelector)
                .with_output(PortSpec::new("model_identifier_out", "Model", DataKind::Text)),
        );
        // The placeholder "None" seeded at placement still counts as a value
        let outputs = run(&node, &unused_text(), &unused_image()).await.unwrap();
        assert_eq!(outputs["model_identifier_out"], serde_json::json!("None"));

        node.data
            .insert("model_identifier_out".to_string(), serde_json::json!(""));
        let error = run(&node, &unused_text(), &unused_image()).await.unwrap_err();
        assert_eq!(error, "No model file selected or output port missing.");
    }

    #[tokio::test]
    async fn test_assembler_drops_empty_parts() {
        let mut node = make(
            NodeDefinition::built_in("Prompt Assembler", "", BuiltInKind::PromptAssembler)
                .with_input(PortSpec::new("prompt_part_1", "Part 1", DataKind::Any))
                .with_input(PortSpec::new("prompt_part_2", "Part 2", DataKind::Any))
                .with_input(PortSpec::new("prompt_part_3", "Part 3", DataKind::Any))
                .with_input(PortSpec::new("prompt_part_4", "Part 4", DataKind::Any))
                .with_input(PortSpec::new("prompt_part_5", "Part 5", DataKind::Any))
                .with_output(PortSpec::new("assembled_prompt_out", "Prompt", DataKind::Text)),
        );
        node.data
            .insert("prompt_part_1".to_string(), serde_json::json!("Hello"));
        node.data
            .insert("prompt_part_2".to_string(), serde_json::json!(""));
        node.data
            .insert("prompt_part_3".to_string(), serde_json::json!("World"));
        node.data
            .insert("prompt_part_4".to_string(), serde_json::Value::Null);
        node.data
            .insert("prompt_part_5".to_string(), serde_json::json!(""));

        let outputs = run(&node, &unused_text(), &unused_image()).await.unwrap();
        assert_eq!(outputs["assembled_prompt_out"], serde_json::json!("Hello World"));
    }

    #[tokio::test]
    async fn test_assembler_serializes_nonstring_parts() {
        let mut node = make(
            NodeDefinition::built_in("Prompt Assembler", "", BuiltInKind::PromptAssembler)
                .with_input(PortSpec::new("prompt_part_1", "Part 1", DataKind::Any))
                .with_input(PortSpec::new("prompt_part_2", "Part 2", DataKind::Any))
                .with_output(PortSpec::new("assembled_prompt_out", "Prompt", DataKind::Text)),
        );
        node.data
            .insert("prompt_part_1".to_string(), serde_json::json!({"a": 1}));
        node.data
            .insert("prompt_part_2".to_string(), serde_json::json!(7));

        let outputs = run(&node, &unused_text(), &unused_image()).await.unwrap();
        assert_eq!(
            outputs["assembled_prompt_out"],
            serde_json::json!("{\"a\":1} 7")
        );
    }

    fn prompt_node(tag: BuiltInKind, web: bool) -> NodeData {
        let mut def = NodeDefinition::built_in("Prompt", "", tag)
            .with_input(PortSpec::new("prompt_in", "Prompt", DataKind::Text))
            .with_output(PortSpec::new("response_out", "Response", DataKind::Text));
        if web {
            def = def.with_web_augmentation();
        }
        make(def)
    }

    #[tokio::test]
    async fn test_prompt_empty_is_an_error() {
        let node = prompt_node(BuiltInKind::LlmPrompt, false);
        let error = run(&node, &unused_text(), &unused_image()).await.unwrap_err();
        assert_eq!(error, "Prompt is empty.");
    }

    #[tokio::test]
    async fn test_wired_prompt_wins_over_body_prompt() {
        let mut node = prompt_node(BuiltInKind::LlmPrompt, false);
        node.data
            .insert(UI_PROMPT_KEY.to_string(), serde_json::json!("typed"));
        node.data
            .insert("prompt_in".to_string(), serde_json::json!("wired"));

        let service = TestTextService::returning("reply");
        let outputs = run(&node, &service, &unused_image()).await.unwrap();
        assert_eq!(outputs["response_out"], serde_json::json!("reply"));
        assert_eq!(service.calls(), vec![("wired".to_string(), false)]);
    }

    #[tokio::test]
    async fn test_empty_wired_prompt_falls_back_to_body() {
        let mut node = prompt_node(BuiltInKind::LlmPrompt, false);
        node.data
            .insert("prompt_in".to_string(), serde_json::json!(""));
        node.data
            .insert(UI_PROMPT_KEY.to_string(), serde_json::json!("typed"));

        let service = TestTextService::returning("reply");
        run(&node, &service, &unused_image()).await.unwrap();
        assert_eq!(service.calls()[0].0, "typed");
    }

    #[tokio::test]
    async fn test_web_augmentation_flag_forwarded() {
        let mut node = prompt_node(BuiltInKind::LlmPrompt, true);
        node.data
            .insert("prompt_in".to_string(), serde_json::json!("check the news"));

        let service = TestTextService::returning("reply");
        run(&node, &service, &unused_image()).await.unwrap();
        assert_eq!(service.calls(), vec![("check the news".to_string(), true)]);
    }

    #[tokio::test]
    async fn test_local_prompt_never_augments() {
        let mut node = prompt_node(BuiltInKind::LocalLlmPrompt, false);
        node.web_augmentation = true;
        node.data
            .insert("prompt_in".to_string(), serde_json::json!("local question"));

        let service = TestTextService::returning("reply");
        run(&node, &service, &unused_image()).await.unwrap();
        assert_eq!(service.calls(), vec![("local question".to_string(), false)]);
    }

    #[tokio::test]
    async fn test_prompt_service_error_becomes_node_error() {
        let mut node = prompt_node(BuiltInKind::LlmPrompt, false);
        node.data
            .insert("prompt_in".to_string(), serde_json::json!("ask"));

        let service = TestTextService::with(|_, _| TextResponse::failed("backend unreachable"));
        let error = run(&node, &service, &unused_image()).await.unwrap_err();
        assert_eq!(error, "backend unreachable");
    }

    fn image_node() -> NodeData {
        make(
            NodeDefinition::built_in("Image Generator", "", BuiltInKind::ImageGenerator)
                .with_input(PortSpec::new("prompt_in", "Prompt", DataKind::Text))
                .with_input(PortSpec::new(
                    "local_model_identifier_in",
                    "Model",
                    DataKind::Text,
                ))
                .with_output(PortSpec::new("image_out", "Image", DataKind::Image)),
        )
    }

    #[tokio::test]
    async fn test_image_prompt_empty_is_an_error() {
        let node = image_node();
        let error = run(&node, &unused_text(), &unused_image()).await.unwrap_err();
        assert_eq!(error, "Image prompt is empty.");
    }

    #[tokio::test]
    async fn test_image_identifier_forwarding() {
        let mut node = image_node();
        node.data
            .insert("prompt_in".to_string(), serde_json::json!("a lighthouse"));

        // "None" and empty identifiers are not forwarded
        for (stored, expected) in [
            (serde_json::json!("None"), None),
            (serde_json::json!(""), None),
            (
                serde_json::json!("model.safetensors"),
                Some("model.safetensors".to_string()),
            ),
        ] {
            node.data
                .insert("local_model_identifier_in".to_string(), stored);
            let service = TestImageService::with(|_, _| "data:image/jpeg;base64,xyz".to_string());
            let outputs = run(&node, &unused_text(), &service).await.unwrap();
            assert_eq!(outputs["image_out"], serde_json::json!("data:image/jpeg;base64,xyz"));
            assert_eq!(service.calls()[0].1, expected);
        }
    }

    #[tokio::test]
    async fn test_image_error_marker_fails_node() {
        let mut node = image_node();
        node.data
            .insert("prompt_in".to_string(), serde_json::json!("a lighthouse"));

        let service = TestImageService::with(|_, _| "Error: model not loaded".to_string());
        let error = run(&node, &unused_text(), &service).await.unwrap_err();
        assert_eq!(error, "Error: model not loaded");
    }

    #[tokio::test]
    async fn test_display_kinds_succeed_inertly() {
        for tag in [
            BuiltInKind::DisplayData,
            BuiltInKind::DisplayImage,
            BuiltInKind::DisplayText,
            BuiltInKind::Sketchpad,
        ] {
            let node = make(NodeDefinition::built_in("Display", "", tag));
            let outputs = run(&node, &unused_text(), &unused_image()).await.unwrap();
            assert!(outputs.is_empty(), "{tag:?}");
        }
    }

    // -- templated ----------------------------------------------------------

    fn summarizer() -> NodeData {
        make(
            NodeDefinition::templated(
                "Summarizer",
                "",
                TemplateSpec::new("Summarize: {text_in}"),
            )
            .with_input(PortSpec::new("text_in", "Text", DataKind::Text))
            .with_output(PortSpec::new("summary_out", "Summary", DataKind::Text)),
        )
    }

    #[tokio::test]
    async fn test_templated_fills_placeholders() {
        let mut node = summarizer();
        node.data
            .insert("text_in".to_string(), serde_json::json!("a long passage"));

        let service = TestTextService::returning("short version");
        let outputs = run(&node, &service, &unused_image()).await.unwrap();

        assert_eq!(service.calls()[0].0, "Summarize: a long passage");
        assert_eq!(outputs["summary_out"], serde_json::json!("short version"));
    }

    #[tokio::test]
    async fn test_templated_missing_input_fills_empty() {
        let node = summarizer();
        let service = TestTextService::returning("ok");
        run(&node, &service, &unused_image()).await.unwrap();
        assert_eq!(service.calls()[0].0, "Summarize: ");
    }

    #[tokio::test]
    async fn test_templated_nonstring_inputs_serialized() {
        let mut node = make(
            NodeDefinition::templated("Formatter", "", TemplateSpec::new("Format {data_in} now"))
                .with_input(PortSpec::new("data_in", "Data", DataKind::Json))
                .with_output(PortSpec::new("out", "Out", DataKind::Text)),
        );
        node.data
            .insert("data_in".to_string(), serde_json::json!({"k": [1, 2]}));

        let service = TestTextService::returning("ok");
        run(&node, &service, &unused_image()).await.unwrap();
        assert_eq!(service.calls()[0].0, "Format {\"k\":[1,2]} now");
    }

    fn two_output_node() -> NodeData {
        make(
            NodeDefinition::templated(
                "Splitter",
                "",
                TemplateSpec::new("Split {text_in} into a title and a body"),
            )
            .with_input(PortSpec::new("text_in", "Text", DataKind::Text))
            .with_output(PortSpec::new("title_out", "Title", DataKind::Text))
            .with_output(PortSpec::new("body_out", "Body", DataKind::Text)),
        )
    }

    #[tokio::test]
    async fn test_multi_output_parses_fenced_json() {
        let node = two_output_node();
        let service = TestTextService::returning(
            "```json\n{\"title_out\": \"A Title\", \"body_out\": \"The body.\"}\n```",
        );

        let outputs = run(&node, &service, &unused_image()).await.unwrap();
        assert_eq!(outputs["title_out"], serde_json::json!("A Title"));
        assert_eq!(outputs["body_out"], serde_json::json!("The body."));
    }

    #[tokio::test]
    async fn test_multi_output_rejects_plain_text() {
        let node = two_output_node();
        let service = TestTextService::returning("just some prose, not JSON");

        let error = run(&node, &service, &unused_image()).await.unwrap_err();
        assert!(
            error.starts_with("Error parsing LLM JSON response for multiple outputs:"),
            "{error}"
        );
        assert!(error.ends_with("Response: just some prose, not JSON"), "{error}");
    }

    #[tokio::test]
    async fn test_multi_output_rejects_json_array() {
        let node = two_output_node();
        let service = TestTextService::returning("[1, 2, 3]");

        let error = run(&node, &service, &unused_image()).await.unwrap_err();
        assert!(error.contains("LLM response not a JSON object."), "{error}");
    }

    #[tokio::test]
    async fn test_error_snippet_is_bounded() {
        let node = two_output_node();
        let long_reply = "x".repeat(500);
        let expected_tail = "x".repeat(100);
        let service = TestTextService::returning(&long_reply);

        let error = run(&node, &service, &unused_image()).await.unwrap_err();
        assert!(error.ends_with(&format!("Response: {expected_tail}")), "{error}");
    }

    #[tokio::test]
    async fn test_empty_template_is_not_executable() {
        let node = make(
            NodeDefinition::templated("Broken", "", TemplateSpec::new(""))
                .with_output(PortSpec::new("out", "Out", DataKind::Text)),
        );
        let error = run(&node, &unused_text(), &unused_image()).await.unwrap_err();
        assert_eq!(error, NOT_EXECUTABLE);
    }

    // -- adapter ------------------------------------------------------------

    fn adapter_node() -> NodeData {
        make(
            NodeDefinition::templated(
                "Universal Data Adapter",
                "",
                TemplateSpec::new(
                    "Convert {input_data_stringified} to {target_data_type} \
                     for port {target_port_name} on {target_node_name} ({target_node_type})",
                )
                .adapting_to_target(),
            )
            .with_input(PortSpec::new("data_in", "Data", DataKind::Any))
            .with_output(PortSpec::new("data_out", "Data", DataKind::Any)),
        )
    }

    fn consumer_node() -> NodeData {
        make(
            NodeDefinition::built_in("Number Display", "", BuiltInKind::DisplayData)
                .with_input(PortSpec::new("number_in", "Number", DataKind::Number)),
        )
    }

    #[tokio::test]
    async fn test_adapter_learns_target_from_edges() {
        let adapter = adapter_node();
        let consumer = consumer_node();
        let document = CanvasDocument {
            nodes: vec![adapter.clone(), consumer.clone()],
            edges: vec![crate::types::Edge {
                id: "edge-1".to_string(),
                source_node_id: adapter.id.clone(),
                source_output_id: "data_out".to_string(),
                target_node_id: consumer.id.clone(),
                target_input_id: "number_in".to_string(),
            }],
        };

        let mut adapter = adapter;
        adapter
            .data
            .insert("data_in".to_string(), serde_json::json!("42"));

        let service = TestTextService::returning("{\"output_data\": 42}");
        let outputs = execute(&adapter, &document, &service, &unused_image())
            .await
            .unwrap();

        let prompt = &service.calls()[0].0;
        assert!(prompt.contains("Convert 42 to number"), "{prompt}");
        assert!(prompt.contains("for port Number on Number Display"), "{prompt}");
        assert_eq!(outputs["data_out"], serde_json::json!(42));
    }

    #[tokio::test]
    async fn test_adapter_unwired_uses_defaults() {
        let mut adapter = adapter_node();
        adapter
            .data
            .insert("data_in".to_string(), serde_json::json!("payload"));

        let service = TestTextService::returning("{\"output_data\": \"payload\"}");
        run(&adapter, &service, &unused_image()).await.unwrap();

        let prompt = &service.calls()[0].0;
        assert!(prompt.contains("to any for port unknown on unknown (unknown)"), "{prompt}");
    }

    #[tokio::test]
    async fn test_adapter_reports_conversion_error() {
        let adapter = adapter_node();
        let service = TestTextService::returning(
            "{\"output_data\": {\"error\": \"cannot convert\", \
             \"original_input_type_detected\": \"text\", \
             \"requested_target_type\": \"number\"}}",
        );

        let error = run(&adapter, &service, &unused_image()).await.unwrap_err();
        assert_eq!(
            error,
            "Adapter Error: cannot convert. Input type: text, Target type: number"
        );
    }

    #[tokio::test]
    async fn test_adapter_missing_output_data() {
        let adapter = adapter_node();
        let service = TestTextService::returning("{\"something_else\": 1}");

        let error = run(&adapter, &service, &unused_image()).await.unwrap_err();
        assert_eq!(error, "Adapter response missing 'output_data'.");
    }

    #[tokio::test]
    async fn test_adapter_parse_failure() {
        let adapter = adapter_node();
        let service = TestTextService::returning("not json at all");

        let error = run(&adapter, &service, &unused_image()).await.unwrap_err();
        assert!(error.starts_with("Error parsing Adapter LLM response:"), "{error}");
        assert!(error.ends_with("Response: not json at all"), "{error}");
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  ```json\n[1]\n```  "), "[1]");
    }
}
