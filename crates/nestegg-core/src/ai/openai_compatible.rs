//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API:
//! - OpenRouter (https://openrouter.ai/api)
//! - vLLM (http://localhost:8000)
//! - LocalAI (http://localhost:8080)
//! - llama-server / llama.cpp (http://localhost:8080)
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (defaults to OpenRouter when only
//!   `OPENROUTER_API_KEY` is set)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name
//! - `OPENAI_COMPATIBLE_API_KEY` or `OPENROUTER_API_KEY`: API key
//! - `NESTEGG_APP_URL`: sent as `HTTP-Referer` (OpenRouter attribution)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::types::ChatRequest;
use super::AIBackend;

/// OpenRouter's API root (the backend appends `/v1/chat/completions`)
pub const OPENROUTER_HOST: &str = "https://openrouter.ai/api";

/// Model used when talking to OpenRouter without an explicit model
pub const OPENROUTER_DEFAULT_MODEL: &str = "deepseek/deepseek-chat-v3-0324:free";

const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_APP_URL: &str = "http://localhost:3000";
const APP_TITLE: &str = "Nestegg";

/// OpenAI-compatible backend
///
/// # Example
///
/// ```rust,ignore
/// // OpenRouter
/// export OPENROUTER_API_KEY="sk-or-..."
///
/// // vLLM
/// export OPENAI_COMPATIBLE_HOST="http://192.168.1.100:8000"
/// export OPENAI_COMPATIBLE_MODEL="meta-llama/Llama-3.2-3B-Instruct"
/// ```
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    /// `HTTP-Referer` attribution header
    referer: Option<String>,
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
            referer: None,
        }
    }

    /// Create with an API key
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        let mut backend = Self::new(base_url, model);
        backend.api_key = Some(api_key.to_string());
        backend
    }

    /// OpenRouter with the default free model
    pub fn openrouter(api_key: &str) -> Self {
        let mut backend = Self::with_api_key(OPENROUTER_HOST, OPENROUTER_DEFAULT_MODEL, api_key);
        backend.referer = Some(DEFAULT_APP_URL.to_string());
        backend
    }

    /// Set the `HTTP-Referer` attribution header
    pub fn with_referer(mut self, referer: &str) -> Self {
        self.referer = Some(referer.to_string());
        self
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }

    /// Create from environment variables
    ///
    /// Uses `OPENAI_COMPATIBLE_HOST` if set, otherwise OpenRouter when
    /// `OPENROUTER_API_KEY` is set. Returns None when neither is available.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_COMPATIBLE_API_KEY")
            .or_else(|_| std::env::var("OPENROUTER_API_KEY"))
            .ok();
        let host = match std::env::var("OPENAI_COMPATIBLE_HOST") {
            Ok(host) => host,
            Err(_) if std::env::var("OPENROUTER_API_KEY").is_ok() => OPENROUTER_HOST.to_string(),
            Err(_) => return None,
        };
        let default_model = if host.starts_with(OPENROUTER_HOST) {
            OPENROUTER_DEFAULT_MODEL
        } else {
            DEFAULT_MODEL
        };
        let model =
            std::env::var("OPENAI_COMPATIBLE_MODEL").unwrap_or_else(|_| default_model.to_string());
        let referer =
            std::env::var("NESTEGG_APP_URL").unwrap_or_else(|_| DEFAULT_APP_URL.to_string());

        let mut backend = Self::new(&host, &model).with_referer(&referer);
        backend.api_key = api_key;
        Some(backend)
    }

    fn build_request(&self, request: &ChatRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if !request.system.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: request.system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.user.clone(),
        });

        ChatCompletionRequest {
            model: request.model.clone().unwrap_or_else(|| self.model.clone()),
            messages,
            temperature: Some(request.temperature),
            max_tokens: Some(request.max_tokens),
            stream: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl AIBackend for OpenAICompatibleBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let body = self.build_request(request);

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&body);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }
        if let Some(ref referer) = self.referer {
            req_builder = req_builder
                .header("HTTP-Referer", referer)
                .header("X-Title", APP_TITLE);
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::UpstreamUnavailable(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::InvalidData("No response from OpenAI API".into()))?;

        debug!(task = %request.task, "OpenAI-compatible response: {}", content);
        Ok(content)
    }

    async fn health_check(&self) -> bool {
        // Try /v1/models first (standard OpenAI endpoint)
        if let Ok(resp) = self
            .http_client
            .get(format!("{}/v1/models", self.base_url))
            .send()
            .await
        {
            if resp.status().is_success() {
                return true;
            }
        }

        // Try /health (common for LocalAI, llama-server)
        if let Ok(resp) = self
            .http_client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
        {
            if resp.status().is_success() {
                return true;
            }
        }

        false
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
