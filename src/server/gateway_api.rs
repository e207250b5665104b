//! Gateway HTTP API.
//!
//! Implements the full endpoint set:
//! - GET  /              (health check)
//! - POST /v1/chat       (buffered or streamed chat completion)
//! - POST /v1/embeddings (text embeddings)

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::error::GatewayError;
use crate::server::streaming::relay_chat_stream;
use crate::upstream::openai::{self, ChatMessage, OpenAiClient};

/// Application state shared across handlers. The reqwest client is a shared
/// connection-pool handle; the credential-bearing upstream client is built
/// per request from it.
pub struct AppState {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Build an upstream client, failing if the credential was never
    /// configured. This is the only configuration check in the system.
    fn openai_client(&self) -> Result<OpenAiClient, GatewayError> {
        let api_key = self
            .config
            .api_key
            .clone()
            .ok_or(GatewayError::MissingApiKey)?;
        Ok(OpenAiClient::new(
            self.http.clone(),
            api_key,
            self.config.base_url.clone(),
        ))
    }
}

/// Build the axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);
    Router::new()
        .route("/", get(health))
        .route("/v1/chat", post(chat))
        .route("/v1/embeddings", post(embeddings))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS policy: all methods and headers, credentialed. An empty allow-list
/// means every requesting origin is echoed back as allowed; a non-empty one
/// echoes only exact matches.
fn cors_layer(config: &Config) -> CorsLayer {
    let origin = if config.cors_origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(
            config
                .cors_origins
                .iter()
                .filter_map(|origin| origin.parse().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

// ─── Request/Response Types ────────────────────────────────────────────────

/// Chat request. Emptiness of `messages` and role membership are not
/// validated; a malformed conversation is forwarded and the upstream
/// provider's own error becomes the failure.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    /// Absent means streamed; an explicit JSON null means buffered.
    #[serde(default = "default_stream")]
    pub stream: Option<bool>,
}

fn default_temperature() -> Option<f64> {
    Some(0.7)
}

fn default_stream() -> Option<bool> {
    Some(true)
}

/// Buffered chat response.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub content: String,
}

/// Embeddings request. `input` is passed through to the upstream provider
/// untouched (string, list of strings, or anything else it accepts).
#[derive(Debug, Deserialize)]
pub struct EmbeddingsRequest {
    pub input: Value,
    pub model: Option<String>,
}

/// Embeddings response. Vectors are positionally aligned with the input;
/// `model` is the name the upstream provider reports, which may differ from
/// the requested alias.
#[derive(Debug, Serialize)]
pub struct EmbeddingsResponse {
    pub embeddings: Vec<Vec<f32>>,
    pub model: String,
    pub usage: Map<String, Value>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

// ─── Route Handlers ────────────────────────────────────────────────────────

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, GatewayError> {
    let request_id = Uuid::new_v4().to_string();
    let model = request
        .model
        .unwrap_or_else(|| state.config.chat_model.clone());
    let stream = request.stream.unwrap_or(false);

    info!(
        request_id = %request_id,
        model = %model,
        messages = request.messages.len(),
        stream,
        "chat request"
    );

    let client = state.openai_client()?;
    let upstream_request = openai::ChatCompletionRequest {
        model,
        messages: request.messages,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        stream,
    };

    if stream {
        let body = Body::from_stream(relay_chat_stream(client, upstream_request));
        Ok(([(CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response())
    } else {
        let content = client.chat(&upstream_request).await?;
        Ok(Json(ChatResponse { content }).into_response())
    }
}

async fn embeddings(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EmbeddingsRequest>,
) -> Result<Json<EmbeddingsResponse>, GatewayError> {
    let request_id = Uuid::new_v4().to_string();
    let model = request
        .model
        .unwrap_or_else(|| state.config.embeddings_model.clone());

    info!(request_id = %request_id, model = %model, "embeddings request");

    let client = state.openai_client()?;
    let result = client
        .embeddings(&openai::EmbeddingsRequest {
            model,
            input: request.input,
        })
        .await?;

    Ok(Json(EmbeddingsResponse {
        embeddings: result.data.into_iter().map(|r| r.embedding).collect(),
        model: result.model,
        usage: result.usage,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_router(config: Config) -> Router {
        build_router(Arc::new(AppState::new(Arc::new(config))))
    }

    #[tokio::test]
    async fn test_health_always_ok() {
        let app = test_router(Config::default());
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_chat_without_api_key_is_500() {
        let app = test_router(Config::default());
        let request = Request::post("/v1/chat")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"messages":[{"role":"user","content":"hi"}],"stream":false}"#,
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "OPENAI_API_KEY is not configured");
    }

    #[tokio::test]
    async fn test_streaming_chat_without_api_key_is_500() {
        // The credential is checked before the response starts, so even the
        // streaming path reports it at the status level.
        let app = test_router(Config::default());
        let request = Request::post("/v1/chat")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"messages":[{"role":"user","content":"hi"}]}"#,
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_embeddings_without_api_key_is_500() {
        let app = test_router(Config::default());
        let request = Request::post("/v1/embeddings")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"input":"hello"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "OPENAI_API_KEY is not configured");
    }

    #[test]
    fn test_chat_request_defaults() {
        let request: ChatRequest = serde_json::from_str(r#"{"messages":[]}"#).unwrap();
        assert!(request.messages.is_empty());
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.stream, Some(true));
        assert!(request.model.is_none());
        assert!(request.max_tokens.is_none());
    }

    #[test]
    fn test_chat_request_null_stream_is_buffered() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"messages":[],"stream":null}"#).unwrap();
        assert_eq!(request.stream, None);
        assert!(!request.stream.unwrap_or(false));
    }

    #[test]
    fn test_embeddings_request_input_passthrough() {
        let request: EmbeddingsRequest =
            serde_json::from_str(r#"{"input":["a","b"],"model":"custom"}"#).unwrap();
        assert!(request.input.is_array());
        assert_eq!(request.model.as_deref(), Some("custom"));

        let request: EmbeddingsRequest = serde_json::from_str(r#"{"input":"one"}"#).unwrap();
        assert!(request.input.is_string());
    }
}
