//! SSE payload reassembly.
//!
//! The upstream streaming endpoint speaks Server-Sent Events: blocks of the
//! form `data: {json}\n\n`, terminated by a literal `data: [DONE]` block.
//! Network chunks arrive at arbitrary byte boundaries, so payloads are
//! buffered until a full block is available.

/// Sentinel payload marking the end of an upstream stream.
pub const DONE_MARKER: &str = "[DONE]";

/// Accumulates raw bytes and yields complete `data:` payloads in order.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    buf: String,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk, returning every payload completed by it.
    /// Non-data lines (comments, `event:` fields, blanks) are skipped.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.push_str(&String::from_utf8_lossy(bytes));

        let mut payloads = Vec::new();
        while let Some(end) = self.buf.find("\n\n") {
            let block = self.buf[..end].to_string();
            self.buf.drain(..end + 2);

            for line in block.lines() {
                if let Some(data) = line.strip_prefix("data: ") {
                    payloads.push(data.to_string());
                }
            }
        }
        payloads
    }
}
