//! Nestegg Web Server
//!
//! JSON API over the budget, expense record and retirement engines, plus an
//! optional static directory for the web UI.
//!
//! Every `/api` request must carry a Cloudflare Access identity or a
//! configured API key unless the server runs with `--no-auth`. Each read and
//! write is audited under the caller's identity. Internal failures reach the
//! client only as a generic message.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use nestegg_core::{Advisor, Database};

mod handlers;

/// Maximum request body size (CSV uploads included)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Upper bound for `limit` query parameters
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Comma-separated API keys accepted as `Authorization: Bearer <key>`
pub const API_KEYS_ENV: &str = "NESTEGG_API_KEYS";

/// Set by Cloudflare Access on requests it has authenticated
const CF_ACCESS_USER_HEADER: &str = "cf-access-authenticated-user-email";

const AUTHORIZATION_HEADER: &str = "authorization";

/// Identity recorded for API key callers
pub const API_KEY_USER: &str = "api-key";

/// Identity recorded when authentication is disabled
pub const LOCAL_DEV_USER: &str = "local-dev";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Reject unauthenticated `/api` requests; on unless `--no-auth`
    pub require_auth: bool,
    /// Cross-origin callers to allow; empty means same-origin only
    pub allowed_origins: Vec<String>,
    /// Bearer keys for scripts and other services
    pub api_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
        }
    }
}

impl ServerConfig {
    /// Default configuration with API keys read from `NESTEGG_API_KEYS`
    pub fn from_env() -> Self {
        Self {
            api_keys: std::env::var(API_KEYS_ENV)
                .map(|v| parse_api_keys(&v))
                .unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// Split a comma-separated key list, dropping blanks
pub fn parse_api_keys(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// State shared by every handler
pub struct AppState {
    pub db: Database,
    pub advisor: Advisor,
    pub config: ServerConfig,
}

/// How a request identified its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    CloudflareHeader,
    ApiKey,
    /// Authentication disabled
    None,
}

/// Caller identity and the way it was established
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: String,
    pub method: AuthMethod,
}

/// Identify the caller from request headers.
///
/// Does not check API keys; `auth_middleware` has already rejected requests
/// whose key is wrong when authentication is on.
pub fn identify(headers: &HeaderMap) -> Identity {
    if let Some(email) = cf_access_user(headers) {
        Identity {
            user: email.to_string(),
            method: AuthMethod::CloudflareHeader,
        }
    } else if bearer_token(headers).is_some() {
        Identity {
            user: API_KEY_USER.to_string(),
            method: AuthMethod::ApiKey,
        }
    } else {
        Identity {
            user: LOCAL_DEV_USER.to_string(),
            method: AuthMethod::None,
        }
    }
}

/// Identity used for audit entries and per-user data
pub fn get_user_email(headers: &HeaderMap) -> String {
    identify(headers).user
}

fn cf_access_user(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CF_ACCESS_USER_HEADER)?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|email| !email.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION_HEADER)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// True when `provided` equals one of `keys`, compared in constant time
fn validate_api_key(provided: &str, keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    // ct_eq only runs in constant time over equal lengths
    keys.iter().any(|key| {
        key.len() == provided.len() && bool::from(key.as_bytes().ct_eq(provided.as_bytes()))
    })
}

/// Reject `/api` requests without a Cloudflare Access identity or a valid API key.
///
/// The Cloudflare header can be forged by anyone who reaches the server
/// directly; only expose it behind Cloudflare Tunnel.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    let headers = request.headers();
    let authenticated = if let Some(email) = cf_access_user(headers) {
        info!(user = %email, path = %path, "Authenticated via Cloudflare Access header");
        true
    } else if bearer_token(headers)
        .is_some_and(|key| validate_api_key(key, &state.config.api_keys))
    {
        info!(user = API_KEY_USER, path = %path, "Authenticated via API key");
        true
    } else {
        false
    };

    if authenticated {
        return next.run(request).await;
    }

    warn!(path = %path, "Rejected request without valid credentials");
    AppError {
        status: StatusCode::UNAUTHORIZED,
        message: "Authentication required".to_string(),
        internal: None,
    }
    .into_response()
}

/// Decode a JSON request body
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::bad_request(&format!("Invalid JSON: {}", e)))
}

/// Create the application router with the advisor configured from the environment
pub fn create_router(
    db: Database,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<Router> {
    let advisor = Advisor::from_env()?;
    Ok(create_router_with_advisor(db, advisor, static_dir, config))
}

/// Create the application router around an explicit advisor (for testing)
pub fn create_router_with_advisor(
    db: Database,
    advisor: Advisor,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> Router {
    let state = Arc::new(AppState {
        db,
        advisor,
        config: config.clone(),
    });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/me", get(handlers::get_me))
        // Budget
        .route("/budget/categories", get(handlers::list_budget_categories))
        .route(
            "/budget",
            get(handlers::get_budget).put(handlers::save_budget),
        )
        .route("/budget/evaluate", post(handlers::evaluate_budget))
        .route("/budget/recommendations", post(handlers::recommend_budget))
        .route("/budget/insights", post(handlers::budget_insights))
        // Expense records
        .route(
            "/records",
            get(handlers::list_records).post(handlers::add_record),
        )
        .route("/records/import", post(handlers::import_records))
        .route("/records/summary", get(handlers::records_summary))
        .route("/records/insights", post(handlers::records_insights))
        .route("/records/ask", post(handlers::ask_about_records))
        .route("/records/:id", get(handlers::get_record))
        // Investment
        .route("/investment/project", post(handlers::project_growth))
        .route(
            "/investment/scenarios",
            post(handlers::investment_scenarios),
        )
        .route("/investment/tips", post(handlers::saving_tips))
        // Audit
        .route("/audit", get(handlers::list_audit_log));

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    // Without an origin list no cross-origin request is allowed
    if !config.allowed_origins.is_empty() {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    let mut app = Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    db: Database,
    advisor: Advisor,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    } else if config.api_keys.is_empty() {
        info!("No API keys configured; only Cloudflare Access identities will be accepted");
    }

    check_ai_connection(&advisor).await;

    let app = create_router_with_advisor(db, advisor, static_dir, config);
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Log whether the configured AI backend answers
async fn check_ai_connection(advisor: &Advisor) {
    match advisor.backend_info() {
        Some(info) => {
            if advisor.health_check().await {
                info!(
                    "✅ AI backend connected: {} at {} (model: {})",
                    info.backend, info.host, info.model
                );
            } else {
                warn!(
                    "⚠️  AI backend configured but not responding: {} (advice will use heuristics)",
                    info.host
                );
            }
        }
        None => {
            info!("ℹ️  AI backend not configured (set AI_BACKEND to enable AI advice)");
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Handler error rendered as `{"error": message}` with its status
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Request failed");
        }
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Caller mistakes keep their message; everything else is masked
        match err.downcast_ref::<nestegg_core::Error>() {
            Some(nestegg_core::Error::InvalidParameters(msg)) => Self::bad_request(msg),
            Some(nestegg_core::Error::Import(msg)) => Self::bad_request(msg),
            Some(nestegg_core::Error::Csv(e)) => Self::bad_request(&e.to_string()),
            Some(nestegg_core::Error::NotFound(msg)) => Self::not_found(msg),
            _ => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "An internal error occurred".to_string(),
                internal: Some(err),
            },
        }
    }
}
