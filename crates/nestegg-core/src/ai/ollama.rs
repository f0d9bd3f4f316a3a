//! Local models through Ollama
//!
//! HTTP client for the Ollama generate API. The system message and sampling
//! settings travel in the request; nothing is streamed.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::types::ChatRequest;
use super::AIBackend;

/// Model used when `OLLAMA_MODEL` is unset
pub const DEFAULT_MODEL: &str = "llama3.2";

#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    default_model: String,
}

impl OllamaBackend {
    /// `base_url` without the `/api` suffix, e.g. `http://localhost:11434`
    pub fn new(base_url: &str, default_model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').into(),
            default_model: default_model.into(),
        }
    }

    /// Same server, another model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            default_model: model.into(),
            ..self.clone()
        }
    }

    /// `OLLAMA_HOST` and `OLLAMA_MODEL`; None when no host is set
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self::new(&host, &model))
    }
}

/// Body of `POST /api/generate`
#[derive(Serialize, Debug)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize, Debug)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize, Debug)]
struct OllamaResponse {
    response: String,
}

#[async_trait]
impl AIBackend for OllamaBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let body = OllamaRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.default_model.clone()),
            prompt: request.user.clone(),
            system: Some(request.system.clone()).filter(|s| !s.is_empty()),
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::UpstreamUnavailable(format!(
                "Ollama returned {}: {}",
                status, detail
            )));
        }

        let OllamaResponse { response: text } = response.json().await?;
        debug!(task = %request.task, chars = text.len(), "Ollama reply received");

        if text.trim().is_empty() {
            return Err(Error::InvalidData("Ollama returned an empty reply".into()));
        }
        Ok(text)
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .is_ok_and(|resp| resp.status().is_success())
    }

    fn model(&self) -> &str {
        &self.default_model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_new() {
        let backend = OllamaBackend::new("http://localhost:11434/", "gemma3");
        assert_eq!(backend.host(), "http://localhost:11434");
        assert_eq!(backend.model(), "gemma3");
        assert_eq!(backend.with_model("llama3.2").model(), "llama3.2");
    }

    #[test]
    fn test_request_serialization() {
        let request = OllamaRequest {
            model: "gemma3".into(),
            prompt: "hello".into(),
            system: None,
            stream: false,
            options: OllamaOptions {
                temperature: 0.3,
                num_predict: 800,
            },
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 800);
        assert!(json.get("system").is_none());
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let backend = OllamaBackend::new("http://127.0.0.1:1", "gemma3");
        assert!(!backend.health_check().await);
    }
}
