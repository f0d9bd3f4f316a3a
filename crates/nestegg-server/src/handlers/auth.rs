//! Identity and service status handlers

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::{identify, AppState, AuthMethod};
use nestegg_core::ai::BackendInfo;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: String,
    pub auth_method: AuthMethod,
}

/// GET /api/me - Who the server thinks the caller is
pub async fn get_me(headers: HeaderMap) -> Json<MeResponse> {
    let identity = identify(&headers);
    Json(MeResponse {
        user: identity.user,
        auth_method: identity.method,
    })
}

/// Response for the /api/health endpoint
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether an AI backend is configured (not whether it is reachable)
    pub ai_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendInfo>,
}

/// GET /api/health - Service status
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        ai_enabled: state.advisor.is_ai_enabled(),
        backend: state.advisor.backend_info(),
    })
}
