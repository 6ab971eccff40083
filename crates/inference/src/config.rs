//! Generation runtime configuration
//!
//! Selects which runtime answers generation calls and where each one
//! lives. A [`ConfigHandle`] is cloned into every client that needs it;
//! clients take a snapshot per request, so updates apply cleanly to the
//! next call without restarting anything. Nothing in this crate reads
//! configuration from globals or the environment.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Out-of-the-box endpoints and model names
pub mod defaults {
    /// Ollama's OpenAI-compatible server
    pub const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";
    pub const OLLAMA_MODEL: &str = "gemma:latest";

    /// LM Studio's local server
    pub const LM_STUDIO_BASE_URL: &str = "http://localhost:1234/v1";
    pub const LM_STUDIO_MODEL: &str = "local-model";

    /// Hosted OpenAI-compatible API
    pub const HOSTED_BASE_URL: &str = "https://api.openai.com/v1";
    pub const HOSTED_MODEL: &str = "gpt-4o-mini";
    /// Hosted image model used when no identifier is forwarded
    pub const HOSTED_IMAGE_MODEL: &str = "dall-e-3";
}

/// Selectable generation runtimes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeKind {
    /// Managed API, requires an api key
    Hosted,
    /// Local Ollama server
    LocalOllama,
    /// Local LM Studio server
    LocalLmStudio,
}

impl RuntimeKind {
    /// Name used in user-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            RuntimeKind::Hosted => "Hosted API",
            RuntimeKind::LocalOllama => "Ollama",
            RuntimeKind::LocalLmStudio => "LM Studio",
        }
    }

    /// Local runtimes need no api key, but image generation against them
    /// needs an explicit model identifier.
    pub fn is_local(&self) -> bool {
        matches!(self, RuntimeKind::LocalOllama | RuntimeKind::LocalLmStudio)
    }
}

/// Where a local OpenAI-compatible server lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSettings {
    /// Server base URL, e.g. `http://localhost:11434/v1`
    pub base_url: String,
    /// Model name sent with requests
    pub model_name: String,
}

/// Hosted runtime settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedSettings {
    /// Api key; the hosted runtime refuses calls without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model_name: String,
}

/// Endpoints for the two supported local runtimes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalEndpoints {
    pub ollama: EndpointSettings,
    pub lm_studio: EndpointSettings,
}

/// Complete generation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Runtime answering generation calls
    pub active_runtime: RuntimeKind,
    pub hosted: HostedSettings,
    pub local_endpoints: LocalEndpoints,
}

impl Default for GenerationConfig {
    /// LM Studio out of the box; the hosted runtime only takes over when
    /// a key is supplied ([`GenerationConfig::with_hosted_key`]).
    fn default() -> Self {
        Self {
            active_runtime: RuntimeKind::LocalLmStudio,
            hosted: HostedSettings {
                api_key: None,
                base_url: defaults::HOSTED_BASE_URL.to_string(),
                model_name: defaults::HOSTED_MODEL.to_string(),
            },
            local_endpoints: LocalEndpoints {
                ollama: EndpointSettings {
                    base_url: defaults::OLLAMA_BASE_URL.to_string(),
                    model_name: defaults::OLLAMA_MODEL.to_string(),
                },
                lm_studio: EndpointSettings {
                    base_url: defaults::LM_STUDIO_BASE_URL.to_string(),
                    model_name: defaults::LM_STUDIO_MODEL.to_string(),
                },
            },
        }
    }
}

impl GenerationConfig {
    /// Default configuration with a hosted api key, active runtime set to
    /// the hosted API.
    pub fn with_hosted_key(key: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.hosted.api_key = Some(key.into());
        config.active_runtime = RuntimeKind::Hosted;
        config
    }
}

/// Partial endpoint update; `None` fields keep their current values
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointUpdate {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Partial hosted-settings update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedUpdate {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Partial configuration update, merged field by field
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    #[serde(default)]
    pub active_runtime: Option<RuntimeKind>,
    #[serde(default)]
    pub hosted: HostedUpdate,
    #[serde(default)]
    pub ollama: EndpointUpdate,
    #[serde(default)]
    pub lm_studio: EndpointUpdate,
}

/// Shared, mutable view of the generation configuration
///
/// Cheap to clone; all clones see the same settings.
#[derive(Clone, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<GenerationConfig>>,
}

impl ConfigHandle {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Owned copy of the current settings
    pub fn snapshot(&self) -> GenerationConfig {
        self.inner.read().clone()
    }

    /// Merge a partial update. Endpoint fields merge individually, so
    /// changing a base URL keeps the configured model name.
    pub fn update(&self, update: ConfigUpdate) {
        let mut config = self.inner.write();
        if let Some(runtime) = update.active_runtime {
            config.active_runtime = runtime;
        }
        if let Some(key) = update.hosted.api_key {
            config.hosted.api_key = Some(key);
        }
        if let Some(url) = update.hosted.base_url {
            config.hosted.base_url = url;
        }
        if let Some(model) = update.hosted.model_name {
            config.hosted.model_name = model;
        }
        if let Some(url) = update.ollama.base_url {
            config.local_endpoints.ollama.base_url = url;
        }
        if let Some(model) = update.ollama.model_name {
            config.local_endpoints.ollama.model_name = model;
        }
        if let Some(url) = update.lm_studio.base_url {
            config.local_endpoints.lm_studio.base_url = url;
        }
        if let Some(model) = update.lm_studio.model_name {
            config.local_endpoints.lm_studio.model_name = model;
        }
        log::debug!(
            "generation config updated; active runtime: {}",
            config.active_runtime.label()
        );
    }
}
