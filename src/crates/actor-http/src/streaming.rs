//! Word-chunking simulation of a streaming response (SPEC_FULL §6). Grounded
//! on `orchestrator::api::ws::batching::EventBatch`'s chunk-and-flush idiom,
//! narrowed from a websocket event batcher to a simple chunked HTTP body.

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use chat_contract::ChatMessage;
use serde::Serialize;

/// Transport a streaming run response is rendered over.
pub enum StreamFormat {
    /// The documented minimum: the final reply chunked into word increments,
    /// delivered as newline-delimited JSON over a chunked body.
    WordChunks,
    /// Server-Sent Events. A real implementation needs a genuine
    /// event-per-token source from the agent itself; that transport is out
    /// of this crate's documented minimum, so the seam exists but is not
    /// wired up.
    Sse,
}

#[derive(Debug, Clone, Serialize)]
struct WordChunk {
    text: String,
    done: bool,
}

fn word_chunks(text: &str) -> Vec<String> {
    text.split_whitespace().enumerate().map(|(i, word)| if i == 0 { word.to_string() } else { format!(" {word}") }).collect()
}

/// Renders `messages` (the full, already-computed reply) as a simulated
/// stream — the agent itself is never re-invoked incrementally.
pub fn simulate(thread_id: &str, messages: &[ChatMessage], format: StreamFormat) -> Response {
    match format {
        StreamFormat::Sse => unimplemented!("SSE streaming is out of scope for the word-chunking minimum"),
        StreamFormat::WordChunks => {
            let text: String = messages.iter().map(ChatMessage::text_content).collect::<Vec<_>>().join(" ");
            let chunks = word_chunks(&text);
            let last = chunks.len().saturating_sub(1);
            let body_stream = async_stream::stream! {
                for (i, chunk) in chunks.into_iter().enumerate() {
                    let payload = WordChunk { text: chunk, done: i == last };
                    let mut line = serde_json::to_vec(&payload).unwrap_or_default();
                    line.push(b'\n');
                    yield Ok::<_, std::io::Error>(line);
                }
            };
            Response::builder()
                .header(header::CONTENT_TYPE, "application/x-ndjson")
                .header("x-thread-id", thread_id)
                .body(Body::from_stream(body_stream))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_chunks_reassemble_to_the_original_text() {
        let chunks = word_chunks("the quick brown fox");
        assert_eq!(chunks.concat(), "the quick brown fox");
    }

    #[test]
    fn word_chunks_of_empty_text_is_empty() {
        assert!(word_chunks("").is_empty());
    }
}
