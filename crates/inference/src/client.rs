//! HTTP client for the configured generation runtime
//!
//! Every runtime speaks the OpenAI-compatible surface, so one client
//! covers all three: the differences come down to endpoint, model name,
//! auth, and a couple of LM Studio request knobs. Chat failures ride back
//! inside [`TextResponse`] and image failures as `"Error:"`-prefixed
//! replies, matching how nodes record failures as their own error state.

use async_trait::async_trait;
use canvas_engine::{ImageGenerationService, TextGenerationService, TextResponse};
use serde_json::{json, Value};

use crate::config::{defaults, ConfigHandle, GenerationConfig, RuntimeKind};

/// Sampling temperature for plain text generation
pub(crate) const CHAT_TEMPERATURE: f64 = 0.7;

/// Generated images come back at this fixed size
const IMAGE_SIZE: &str = "512x512";

/// Client for hosted and local OpenAI-compatible generation runtimes
pub struct HttpGenerationClient {
    http: reqwest::Client,
    config: ConfigHandle,
}

impl HttpGenerationClient {
    pub fn new(config: ConfigHandle) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Handle used to read or change runtime settings
    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    /// One chat-completions round trip against the active runtime.
    pub(crate) async fn chat(&self, prompt: &str, temperature: f64) -> TextResponse {
        let config = self.config.snapshot();
        let target = match resolve_target(&config) {
            Ok(target) => target,
            Err(message) => return TextResponse::failed(message),
        };
        let url = target.chat_url();
        let body = chat_body(&target, prompt, temperature);

        let mut request = self.http.post(&url).json(&body);
        if let Some(key) = &target.api_key {
            request = request.bearer_auth(key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => return TextResponse::failed(transport_failure(&target, &err)),
        };
        if !response.status().is_success() {
            let detail = describe_http_failure(response, target.label(), &url).await;
            return TextResponse::failed(detail);
        }

        let data: Value = match response.json().await {
            Ok(data) => data,
            Err(err) => return TextResponse::failed(format!("{} Error: {err}", target.label())),
        };
        extract_chat_text(&data, target.label())
    }

    async fn image(&self, prompt: &str, model_identifier: Option<&str>) -> String {
        let config = self.config.snapshot();
        let target = match resolve_target(&config) {
            Ok(target) => target,
            Err(message) => return format!("Error: {message}"),
        };
        let label = target.label();

        let model = if target.runtime.is_local() {
            match model_identifier {
                Some(identifier) => identifier.to_string(),
                None => {
                    return format!(
                        "Error: For local image generation with {label}, a model identifier \
                         must be provided (e.g., from 'Local Model File Selector' or a \
                         specific model name if your server routes it)."
                    );
                }
            }
        } else {
            model_identifier
                .map(str::to_string)
                .unwrap_or_else(|| defaults::HOSTED_IMAGE_MODEL.to_string())
        };

        let url = target.image_url();
        let body = json!({
            "model": model,
            "prompt": prompt,
            "n": 1,
            "size": IMAGE_SIZE,
            "response_format": "b64_json",
        });

        let mut request = self.http.post(&url).json(&body);
        if let Some(key) = &target.api_key {
            request = request.bearer_auth(key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => return format!("Error: {}", image_transport_failure(&target, &err)),
        };
        if !response.status().is_success() {
            let detail = describe_http_failure(response, label, &url).await;
            return format!("Error: {}", with_image_endpoint_hint(&target, detail));
        }

        let data: Value = match response.json().await {
            Ok(data) => data,
            Err(err) => return format!("Error: {label} Image Gen Error: {err}"),
        };
        match data["data"][0]["b64_json"].as_str() {
            Some(b64) => format!("data:image/jpeg;base64,{b64}"),
            None => format!(
                "Error: {label} image endpoint response did not contain expected image data \
                 format (data[0].b64_json). Response: {}",
                snippet(&data.to_string(), 200)
            ),
        }
    }
}

#[async_trait]
impl TextGenerationService for HttpGenerationClient {
    async fn generate_text(&self, prompt: &str, web_augmentation: bool) -> TextResponse {
        if web_augmentation {
            // none of the OpenAI-compatible runtimes ground replies with
            // web results; the prompt goes out as-is
            log::debug!("web augmentation requested but unsupported by the active runtime");
        }
        self.chat(prompt, CHAT_TEMPERATURE).await
    }
}

#[async_trait]
impl ImageGenerationService for HttpGenerationClient {
    async fn generate_image(&self, prompt: &str, model_identifier: Option<&str>) -> String {
        self.image(prompt, model_identifier).await
    }
}

/// Per-request view of the active runtime
#[derive(Debug)]
struct Target {
    runtime: RuntimeKind,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl Target {
    /// `{base}/chat/completions`, tolerating a trailing slash on the base
    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn image_url(&self) -> String {
        format!("{}/images/generations", self.base_url.trim_end_matches('/'))
    }

    fn label(&self) -> &'static str {
        self.runtime.label()
    }
}

/// Resolve the active runtime into a request target, or a user-facing
/// message when it cannot serve requests.
fn resolve_target(config: &GenerationConfig) -> Result<Target, String> {
    match config.active_runtime {
        RuntimeKind::Hosted => {
            let api_key = config
                .hosted
                .api_key
                .clone()
                .filter(|key| !key.is_empty())
                .ok_or_else(|| {
                    "Hosted API key not configured. Add a key in the generation settings \
                     or switch to a local runtime."
                        .to_string()
                })?;
            if config.hosted.base_url.is_empty() {
                return Err(format!(
                    "{} endpoint URL not configured.",
                    RuntimeKind::Hosted.label()
                ));
            }
            Ok(Target {
                runtime: RuntimeKind::Hosted,
                base_url: config.hosted.base_url.clone(),
                model: config.hosted.model_name.clone(),
                api_key: Some(api_key),
            })
        }
        runtime @ (RuntimeKind::LocalOllama | RuntimeKind::LocalLmStudio) => {
            let endpoint = match runtime {
                RuntimeKind::LocalOllama => &config.local_endpoints.ollama,
                _ => &config.local_endpoints.lm_studio,
            };
            if endpoint.base_url.is_empty() {
                return Err(format!("{} endpoint URL not configured.", runtime.label()));
            }
            let model = if endpoint.model_name.is_empty() {
                match runtime {
                    RuntimeKind::LocalOllama => defaults::OLLAMA_MODEL,
                    _ => defaults::LM_STUDIO_MODEL,
                }
                .to_string()
            } else {
                endpoint.model_name.clone()
            };
            Ok(Target {
                runtime,
                base_url: endpoint.base_url.clone(),
                model,
                api_key: None,
            })
        }
    }
}

/// OpenAI-compatible chat request body. LM Studio additionally gets
/// `stream: false` and an unlimited `max_tokens`.
fn chat_body(target: &Target, prompt: &str, temperature: f64) -> Value {
    let mut body = json!({
        "model": target.model,
        "messages": [{ "role": "user", "content": prompt }],
        "temperature": temperature,
    });
    if target.runtime == RuntimeKind::LocalLmStudio {
        body["stream"] = json!(false);
        body["max_tokens"] = json!(-1);
    }
    body
}

/// Pull the reply text out of a chat-completions response.
fn extract_chat_text(data: &Value, label: &str) -> TextResponse {
    let text = data["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or_default();
    if !text.is_empty() {
        return TextResponse::ok(text);
    }
    if let Some(error) = data.get("error") {
        let message = error
            .as_str()
            .or_else(|| error["message"].as_str())
            .unwrap_or("Unknown error");
        return TextResponse::failed(format!("{label} reported: {message}"));
    }
    if data["choices"][0]["message"].is_object() {
        // an existing message with empty content is a valid (if useless) reply
        return TextResponse::ok("");
    }
    TextResponse::failed(format!(
        "Unexpected response structure from {label}. No message content found."
    ))
}

/// Turn a non-2xx response into a user-facing message, preferring the
/// error shapes the servers actually send over a raw body dump.
async fn describe_http_failure(response: reqwest::Response, label: &str, url: &str) -> String {
    let status = response.status();
    let base = format!("Network response was not ok ({status}) from {label} at {url}.");
    let body = match response.text().await {
        Ok(body) => body,
        Err(_) => {
            return format!(
                "{base} Could not retrieve detailed error message from {label} response."
            );
        }
    };
    if let Ok(parsed) = serde_json::from_str::<Value>(&body) {
        if let Some(message) = parsed["error"].as_str() {
            return format!("Error from {label} ({status}): {message}");
        }
        if let Some(message) = parsed["error"]["message"].as_str() {
            return format!("Error from {label} ({status}): {message}");
        }
        if let Some(message) = parsed["message"].as_str() {
            return format!("Error from {label} ({status}): {message}");
        }
    }
    let mut shown = snippet(&body, 500);
    if body.chars().count() > 500 {
        shown.push_str("...");
    }
    format!("{base} Server response: {shown}")
}

/// Message for a chat request that never produced a response.
fn transport_failure(target: &Target, err: &reqwest::Error) -> String {
    let mut message = format!("{} Error: {err}", target.label());
    if err.is_connect() || err.is_timeout() {
        message.push_str(&connectivity_hint(target.label(), &target.base_url));
    }
    message
}

/// Message for an image request that never produced a response.
fn image_transport_failure(target: &Target, err: &reqwest::Error) -> String {
    let mut message = format!("{} Image Gen Error: {err}", target.label());
    if err.is_connect() || err.is_timeout() {
        message.push_str(&connectivity_hint(target.label(), &target.base_url));
    }
    message
}

/// Appended when the server cannot be reached at all.
fn connectivity_hint(label: &str, base_url: &str) -> String {
    format!(
        " (Hint: This often means the {label} server at {base_url} is not running, not \
         reachable, or refusing connections. Please verify the server is active, the \
         configured base URL ('{base_url}') is correct, and check the {label} server's \
         own console logs for any specific error messages.)"
    )
}

/// LM Studio servers without an image route answer with this phrase;
/// point at the server setup instead of the workflow.
fn with_image_endpoint_hint(target: &Target, detail: String) -> String {
    if target.runtime == RuntimeKind::LocalLmStudio
        && detail.contains("Unexpected endpoint or method")
    {
        format!(
            "{detail} (Hint: LM Studio's standard server may not support the \
             '/v1/images/generations' endpoint out-of-the-box for all loaded models, or it \
             might require a specific image generation model to be active and correctly \
             configured. Check your LM Studio server setup and ensure the loaded model \
             supports image generation via this endpoint.)"
        )
    } else {
        detail
    }
}

/// First `max` characters of a possibly long body
pub(crate) fn snippet(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
