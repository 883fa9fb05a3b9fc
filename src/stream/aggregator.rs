//! Folding a generation stream into one text.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use super::decoder::{parse_event, FrameDecoder};
use crate::backend::MarketingBackend;
use crate::error::Result;
use crate::types::{AggregateResult, GenerationRequest, StreamEvent};

/// Per-fragment callback. Receives exactly the new fragment, never the
/// running total.
pub type ChunkCallback<'a> = &'a mut (dyn FnMut(&str) + Send);

/// Decode a raw byte stream into events.
///
/// Unparseable frames are logged and skipped. The stream ends right after a
/// `complete` event without reading further bytes, or when the transport
/// ends. A transport error is yielded once and ends the stream.
pub fn events<S>(bytes: S) -> impl Stream<Item = Result<StreamEvent>> + Send
where
    S: Stream<Item = Result<Bytes>> + Send,
{
    async_stream::stream! {
        let mut decoder = FrameDecoder::new();
        futures::pin_mut!(bytes);

        while let Some(chunk) = bytes.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            for payload in decoder.push(&chunk) {
                match parse_event(&payload) {
                    Ok(event @ StreamEvent::Complete { .. }) => {
                        yield Ok(event);
                        return;
                    }
                    Ok(event) => yield Ok(event),
                    Err(e) => warn!(error = %e, "skipping unparseable stream frame"),
                }
            }
        }

        if let Some(payload) = decoder.finish() {
            match parse_event(&payload) {
                Ok(event) => yield Ok(event),
                Err(e) => warn!(error = %e, "skipping unparseable trailing frame"),
            }
        }
    }
}

/// Consume a raw byte stream, invoking `on_chunk` once per non-empty fragment.
///
/// Resolves as soon as `complete` is seen. If the transport ends first, the
/// text gathered so far is returned with `completed == false`.
pub async fn aggregate<S>(bytes: S, mut on_chunk: Option<ChunkCallback<'_>>) -> Result<AggregateResult>
where
    S: Stream<Item = Result<Bytes>> + Send,
{
    let events = events(bytes);
    futures::pin_mut!(events);

    let mut result = AggregateResult::default();
    while let Some(event) = events.next().await {
        match event? {
            StreamEvent::Chunk { content } => {
                if content.is_empty() {
                    continue;
                }
                result.full_text.push_str(&content);
                if let Some(callback) = on_chunk.as_deref_mut() {
                    callback(&content);
                }
            }
            StreamEvent::Complete { timestamp } => {
                result.timestamp = timestamp;
                result.completed = true;
                break;
            }
        }
    }

    if !result.completed {
        debug!(
            len = result.full_text.len(),
            "generation stream ended without a complete event"
        );
    }
    Ok(result)
}

/// Open a generation stream on `backend` and aggregate it.
pub async fn generate(
    backend: &dyn MarketingBackend,
    request: &GenerationRequest,
    on_chunk: Option<ChunkCallback<'_>>,
) -> Result<AggregateResult> {
    let bytes = backend.open_generation(request).await?;
    aggregate(bytes, on_chunk).await
}
