//! reqwest client and wire types for the upstream OpenAI-compatible API.
//!
//! The client is a thin per-request wrapper: it holds the credential and the
//! base URL alongside a shared connection-pool handle. Nothing here leaks
//! into the gateway's public surface; handlers translate between these wire
//! shapes and the gateway schemas.

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::GatewayError;
use crate::upstream::sse::{SseLineBuffer, DONE_MARKER};

// ─── Wire Types ────────────────────────────────────────────────────────────

/// One conversation turn. The role is forwarded verbatim; membership in
/// {system, user, assistant} is the upstream provider's problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Chat completion request body (OpenAI wire format).
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

/// Non-streaming chat completion response, reduced to what the gateway reads.
#[derive(Debug, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
}

/// One parsed SSE chunk of a streamed chat completion.
#[derive(Debug, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkChoice {
    pub delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChunkDelta {
    pub content: Option<String>,
}

/// Embeddings request body. `input` is whatever the caller sent, untouched.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingsRequest {
    pub model: String,
    pub input: Value,
}

/// Embeddings response. `data` is positionally aligned with the input;
/// `usage` is kept as a plain JSON object whatever its exact fields are.
#[derive(Debug, Deserialize)]
pub struct EmbeddingsResult {
    #[serde(default)]
    pub data: Vec<EmbeddingRecord>,
    pub model: String,
    #[serde(default)]
    pub usage: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingRecord {
    pub embedding: Vec<f32>,
}

// ─── Client ────────────────────────────────────────────────────────────────

/// Upstream API client. Cheap to construct per request: the underlying
/// `reqwest::Client` is a handle over a shared connection pool.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            http,
            api_key,
            base_url,
        }
    }

    /// POST a JSON body and fail on any non-2xx status, folding the status
    /// and response body into the error text.
    async fn post<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            return Err(GatewayError::Upstream(format!(
                "upstream returned {status}: {body}"
            )));
        }
        Ok(response)
    }

    /// Issue a buffered chat completion and return the first choice's text.
    /// A missing or null content field collapses to the empty string.
    pub async fn chat(&self, request: &ChatCompletionRequest) -> Result<String, GatewayError> {
        let completion: ChatCompletion = self
            .post("/chat/completions", request)
            .await?
            .json()
            .await?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }

    /// Open a streamed chat completion and yield content deltas in arrival
    /// order. The stream ends at the upstream `[DONE]` sentinel or when the
    /// connection closes; transport failures surface as stream errors.
    pub async fn chat_stream(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<impl Stream<Item = Result<String, GatewayError>>, GatewayError> {
        let response = self.post("/chat/completions", request).await?;
        let mut bytes = response.bytes_stream();

        Ok(try_stream! {
            let mut lines = SseLineBuffer::new();
            'read: while let Some(chunk) = bytes.next().await {
                let chunk = chunk?;
                for payload in lines.push(&chunk) {
                    if payload.trim() == DONE_MARKER {
                        break 'read;
                    }
                    // Unparseable chunks are skipped, not fatal.
                    let Ok(parsed) = serde_json::from_str::<StreamChunk>(&payload) else {
                        debug!(payload = %payload, "skipping unparseable stream chunk");
                        continue;
                    };
                    if let Some(content) = parsed
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|choice| choice.delta.content)
                    {
                        if !content.is_empty() {
                            yield content;
                        }
                    }
                }
            }
        })
    }

    /// Issue an embeddings call, returning vectors in input order plus the
    /// model name as reported by the upstream provider.
    pub async fn embeddings(
        &self,
        request: &EmbeddingsRequest,
    ) -> Result<EmbeddingsResult, GatewayError> {
        let result = self.post("/embeddings", request).await?.json().await?;
        Ok(result)
    }
}
