//! llm-gateway: thin HTTP gateway in front of an OpenAI-compatible API.
//!
//! Forwards chat-completion and embedding requests to the upstream provider
//! and relays streamed tokens back to the caller as a chunked `text/plain`
//! body. There is no state beyond a single request's lifetime: no caching,
//! no retries, no cross-request coordination.

pub mod config;
pub mod error;
pub mod server;
pub mod upstream;
