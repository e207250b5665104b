//! Relay of a streamed upstream chat completion onto the response body.
//!
//! Each upstream delta is forwarded immediately as raw bytes, in arrival
//! order, with no buffering ahead. Once the response has started the HTTP
//! status can no longer change, so a failure at any point after that is
//! signalled in-band: the stream ends with a single literal
//! `[STREAM_ERROR]: <message>` chunk and nothing after it. A normal end of
//! stream is followed by one final empty chunk.

use std::convert::Infallible;

use async_stream::stream;
use bytes::Bytes;
use futures::{pin_mut, Stream, StreamExt};
use tracing::warn;

use crate::upstream::openai::{ChatCompletionRequest, OpenAiClient};

/// Literal prefix of the in-band error marker. Callers depend on this exact
/// text; it must never be upgraded to a structured error.
pub const STREAM_ERROR_PREFIX: &str = "[STREAM_ERROR]: ";

/// Convert an upstream streamed completion into a body chunk stream.
pub fn relay_chat_stream(
    client: OpenAiClient,
    request: ChatCompletionRequest,
) -> impl Stream<Item = Result<Bytes, Infallible>> {
    stream! {
        match client.chat_stream(&request).await {
            Err(err) => {
                warn!(error = %err, "upstream stream failed to open");
                yield Ok(error_chunk(&err.to_string()));
            }
            Ok(upstream) => {
                pin_mut!(upstream);
                let mut failed = false;
                while let Some(delta) = upstream.next().await {
                    match delta {
                        Ok(text) => yield Ok(Bytes::from(text)),
                        Err(err) => {
                            warn!(error = %err, "upstream stream failed mid-flight");
                            yield Ok(error_chunk(&err.to_string()));
                            failed = true;
                            break;
                        }
                    }
                }
                // Empty terminator chunk signals normal completion.
                if !failed {
                    yield Ok(Bytes::new());
                }
            }
        }
    }
}

fn error_chunk(message: &str) -> Bytes {
    Bytes::from(format!("{STREAM_ERROR_PREFIX}{message}"))
}
