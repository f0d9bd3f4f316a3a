//! Test utilities for nestegg-core
//!
//! A mock chat server speaking both the OpenAI-compatible and the Ollama
//! wire formats, for integration tests of the real HTTP backends.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// How the mock server answers completion requests
#[derive(Clone, Debug)]
pub enum MockServerReply {
    /// Reply with this text
    Text(String),
    /// Fail every completion with 503
    Unavailable,
}

#[derive(Clone)]
struct ServerState {
    reply: MockServerReply,
    requests: Arc<AtomicUsize>,
    last_user_prompt: Arc<std::sync::Mutex<Option<String>>>,
}

/// Mock chat completions server for testing and development
pub struct MockChatServer {
    addr: SocketAddr,
    state: ServerState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockChatServer {
    /// Start a server answering every completion with `text`
    pub async fn start(text: &str) -> Self {
        Self::start_with(MockServerReply::Text(text.to_string())).await
    }

    /// Start a server whose completions all fail
    pub async fn start_unavailable() -> Self {
        Self::start_with(MockServerReply::Unavailable).await
    }

    /// Start the mock server on an available port
    pub async fn start_with(reply: MockServerReply) -> Self {
        let state = ServerState {
            reply,
            requests: Arc::default(),
            last_user_prompt: Arc::default(),
        };

        let app = Router::new()
            .route("/v1/chat/completions", post(handle_chat))
            .route("/v1/models", get(handle_models))
            .route("/api/generate", post(handle_generate))
            .route("/api/tags", get(handle_tags))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Completion requests received so far
    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// The user prompt of the most recent completion request
    pub fn last_user_prompt(&self) -> Option<String> {
        self.state.last_user_prompt.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockChatServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Deserialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct GenerateRequest {
    prompt: String,
}

fn record(state: &ServerState, prompt: String) {
    state.requests.fetch_add(1, Ordering::SeqCst);
    *state.last_user_prompt.lock().unwrap() = Some(prompt);
}

/// OpenAI-compatible chat completions endpoint
async fn handle_chat(
    State(state): State<ServerState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let prompt = request
        .messages
        .into_iter()
        .filter(|m| m.role == "user")
        .map(|m| m.content)
        .last()
        .unwrap_or_default();
    record(&state, prompt);

    match &state.reply {
        MockServerReply::Text(text) => Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": text},
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
        MockServerReply::Unavailable => {
            (StatusCode::SERVICE_UNAVAILABLE, "model overloaded").into_response()
        }
    }
}

/// Ollama generate endpoint
async fn handle_generate(
    State(state): State<ServerState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    record(&state, request.prompt);

    match &state.reply {
        MockServerReply::Text(text) => Json(json!({
            "model": "mock",
            "response": text,
            "done": true
        }))
        .into_response(),
        MockServerReply::Unavailable => {
            (StatusCode::SERVICE_UNAVAILABLE, "model overloaded").into_response()
        }
    }
}

async fn handle_models() -> Json<Value> {
    Json(json!({"object": "list", "data": [{"id": "mock", "object": "model"}]}))
}

async fn handle_tags() -> Json<Value> {
    Json(json!({"models": [{"name": "mock:latest", "size": 1}]}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{
        AIBackend, AdviceTask, ChatRequest as AiRequest, OllamaBackend, OpenAICompatibleBackend,
    };

    #[tokio::test]
    async fn test_openai_compatible_against_mock_server() {
        let server = MockChatServer::start("Food").await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "mock");

        assert!(backend.health_check().await);
        let request = AiRequest::new(AdviceTask::CategorizeExpense, "sys", "Categorize: pizza");
        assert_eq!(backend.complete(&request).await.unwrap(), "Food");
        assert_eq!(server.requests(), 1);
        assert_eq!(server.last_user_prompt().as_deref(), Some("Categorize: pizza"));
    }

    #[tokio::test]
    async fn test_ollama_against_mock_server() {
        let server = MockChatServer::start("Bills").await;
        let backend = OllamaBackend::new(&server.url(), "mock");

        assert!(backend.health_check().await);
        let request = AiRequest::new(AdviceTask::CategorizeExpense, "", "Electric bill");
        assert_eq!(backend.complete(&request).await.unwrap(), "Bills");
    }

    #[tokio::test]
    async fn test_unavailable_is_upstream_error() {
        let server = MockChatServer::start_unavailable().await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "mock");

        let request = AiRequest::new(AdviceTask::AnswerQuestion, "", "?");
        let err = backend.complete(&request).await.unwrap_err();
        assert!(err.is_upstream());
    }
}
