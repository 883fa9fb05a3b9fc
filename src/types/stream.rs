//! Streaming types.

use serde::{Deserialize, Serialize};

/// One decoded event from the text-generation stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental text fragment.
    Chunk {
        #[serde(default)]
        content: String,
    },
    /// Terminal marker; no more chunks follow.
    Complete {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
    },
}

/// Final result after consuming a generation stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResult {
    /// Every chunk's content, concatenated in arrival order.
    pub full_text: String,
    /// Timestamp carried by the `complete` event, if one arrived.
    pub timestamp: Option<String>,
    /// Whether a `complete` event was observed before the transport ended.
    pub completed: bool,
}
