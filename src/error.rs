//! Gateway error taxonomy.
//!
//! Two failure classes exist: a missing credential (surfaced at first use,
//! not at startup) and an upstream call failure (all upstream exceptions are
//! treated uniformly). Both map to HTTP 500 with `{"detail": <text>}`.
//! Failures after a streamed response has started never pass through here;
//! they become an in-band marker chunk instead (see `server::streaming`).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The upstream credential was never configured.
    #[error("OPENAI_API_KEY is not configured")]
    MissingApiKey,

    /// Any failure talking to the upstream provider: network, auth,
    /// rate limit, or a response that does not parse.
    #[error("{0}")]
    Upstream(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Upstream(err.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": self.to_string() })),
        )
            .into_response()
    }
}
