//! Client for the upstream OpenAI-compatible API.
//!
//! - [`openai`]: reqwest-based client and wire types
//! - [`sse`]: reassembly of `data:` payloads from a chunked SSE byte stream

pub mod openai;
pub mod sse;
