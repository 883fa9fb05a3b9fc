//! Streaming response aggregation.

pub mod aggregator;
pub mod decoder;

pub use aggregator::{aggregate, events, generate, ChunkCallback};
pub use decoder::{frame_payload, parse_event, FrameDecoder, Utf8Decoder};
