//! Incremental decoding of the `data: <json>\n\n` event protocol.
//!
//! Two buffers persist across reads: a byte-level buffer holding an
//! incomplete UTF-8 sequence from the end of the previous read, and a
//! text-level buffer holding a frame whose delimiter has not arrived yet.

use crate::error::{GeneratorError, Result};
use crate::types::StreamEvent;

/// Frame delimiter: one blank line.
pub const FRAME_DELIMITER: &str = "\n\n";

const DATA_PREFIX: &str = "data:";

/// Streaming UTF-8 decoder that carries split multi-byte sequences forward.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `bytes` as forms complete characters.
    ///
    /// An incomplete sequence at the end is kept for the next call. Invalid
    /// sequences are replaced with U+FFFD.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(bytes);

        let mut out = String::with_capacity(input.len());
        let mut rest = input.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(err) => {
                    let (valid, tail) = rest.split_at(err.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &tail[len..];
                        }
                        None => {
                            self.pending = tail.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush whatever is left at end of stream.
    pub fn finish(&mut self) -> String {
        let pending = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&pending).into_owned()
    }

    /// Number of bytes waiting for the rest of their character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Splits decoded text into frames and extracts their `data:` payloads.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    utf8: Utf8Decoder,
    text: String,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw transport buffer; returns the payloads of every frame it
    /// completed, in order.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let decoded = self.utf8.decode(bytes);
        self.text.push_str(&decoded);

        let mut payloads = Vec::new();
        let mut consumed = 0;
        while let Some(end) = self.text[consumed..].find(FRAME_DELIMITER) {
            let frame = &self.text[consumed..consumed + end];
            if let Some(payload) = frame_payload(frame) {
                payloads.push(payload.to_string());
            }
            consumed += end + FRAME_DELIMITER.len();
        }
        self.text.drain(..consumed);
        payloads
    }

    /// Flush at end of stream. A final frame missing its trailing delimiter
    /// is still returned.
    pub fn finish(&mut self) -> Option<String> {
        let tail = self.utf8.finish();
        self.text.push_str(&tail);
        let rest = std::mem::take(&mut self.text);
        frame_payload(&rest).map(str::to_string)
    }

    /// Bytes and characters buffered but not yet emitted as a frame.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.utf8.pending_len() == 0
    }
}

/// Extract the JSON payload of one frame, or `None` if the frame is not a
/// `data:` frame or carries nothing.
pub fn frame_payload(frame: &str) -> Option<&str> {
    let frame = frame.trim_start_matches(|c: char| c == '\r' || c == '\n');
    let payload = frame.strip_prefix(DATA_PREFIX)?.trim();
    (!payload.is_empty()).then_some(payload)
}

/// Parse one payload into a [`StreamEvent`].
pub fn parse_event(payload: &str) -> Result<StreamEvent> {
    serde_json::from_str(payload).map_err(|e| GeneratorError::StreamParse(format!("{e}: {payload}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn utf8_sequence_split_across_reads_is_carried() {
        let bytes = "héllo".as_bytes();
        // 'é' is 0xC3 0xA9; split between them.
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&bytes[..2]), "h");
        assert_eq!(decoder.pending_len(), 1);
        assert_eq!(decoder.decode(&bytes[2..]), "éllo");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn four_byte_character_split_three_ways() {
        let bytes = "a🚀b".as_bytes();
        let mut decoder = Utf8Decoder::new();
        let mut out = String::new();
        out.push_str(&decoder.decode(&bytes[..2]));
        out.push_str(&decoder.decode(&bytes[2..4]));
        out.push_str(&decoder.decode(&bytes[4..]));
        assert_eq!(out, "a🚀b");
    }

    #[test]
    fn invalid_bytes_become_replacement_characters() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"a\xFFb"), "a\u{FFFD}b");
        assert_eq!(decoder.decode(b"\xE2\x82"), "");
        assert_eq!(decoder.finish(), "\u{FFFD}");
    }

    #[test]
    fn frame_split_at_delimiter_is_one_frame() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"data: {\"type\":\"chunk\",\"content\":\"a\"}\n").is_empty());
        assert_eq!(
            decoder.push(b"\ndata: {\"type\":\"chunk\",\"content\":\"b\"}\n\n"),
            vec![
                r#"{"type":"chunk","content":"a"}"#.to_string(),
                r#"{"type":"chunk","content":"b"}"#.to_string(),
            ]
        );
        assert!(decoder.is_empty());
    }

    #[test]
    fn non_data_frames_are_dropped() {
        let mut decoder = FrameDecoder::new();
        let payloads = decoder.push(b": keep-alive\n\nevent: ping\n\ndata:\n\ndata:{\"x\":1}\n\n");
        assert_eq!(payloads, vec![r#"{"x":1}"#.to_string()]);
    }

    #[test]
    fn each_frame_is_emitted_once() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.push(b"data: 1\n\ndata: 2").len(), 1);
        assert_eq!(decoder.push(b"\n\n"), vec!["2".to_string()]);
        assert!(decoder.push(b"").is_empty());
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn finish_returns_unterminated_final_frame() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"data: {\"type\":\"complete\"}").is_empty());
        assert_eq!(decoder.finish(), Some(r#"{"type":"complete"}"#.to_string()));
    }

    #[test]
    fn payload_prefix_whitespace_is_optional() {
        assert_eq!(frame_payload("data:{}"), Some("{}"));
        assert_eq!(frame_payload("data: \t{}"), Some("{}"));
        assert_eq!(frame_payload("\ndata: {}"), Some("{}"));
        assert_eq!(frame_payload("id: 3"), None);
        assert_eq!(frame_payload("data:   "), None);
    }

    #[test]
    fn parse_event_recognizes_both_variants() {
        assert_eq!(
            parse_event(r#"{"type":"chunk","content":"hi"}"#).unwrap(),
            StreamEvent::Chunk {
                content: "hi".into()
            }
        );
        assert_eq!(
            parse_event(r#"{"type":"complete","timestamp":"2024-05-01T00:00:00Z"}"#).unwrap(),
            StreamEvent::Complete {
                timestamp: Some("2024-05-01T00:00:00Z".into())
            }
        );
        assert_eq!(
            parse_event(r#"{"type":"chunk"}"#).unwrap(),
            StreamEvent::Chunk {
                content: String::new()
            }
        );
    }

    #[test]
    fn parse_event_rejects_unknown_shapes() {
        for payload in [r#"{"type":"usage"}"#, r#"{"content":"x"}"#, "not json"] {
            assert!(matches!(
                parse_event(payload),
                Err(GeneratorError::StreamParse(_))
            ));
        }
    }
}
