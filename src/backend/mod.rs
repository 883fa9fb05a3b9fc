//! Marketing backend trait and its HTTP implementation.

pub mod http;

pub use http::HttpBackend;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::types::{AdImageRequest, AdImageResponse, AdviceRequest, GenerationRequest};

/// Raw body of a streamed generation response, one transport buffer per item.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// The three endpoints the results runner talks to.
#[async_trait]
pub trait MarketingBackend: Send + Sync {
    /// `POST /search-selling-advice`. The response is opaque and is embedded
    /// verbatim into later prompts.
    async fn search_selling_advice(&self, request: &AdviceRequest) -> Result<serde_json::Value>;

    /// `POST /claude`. Resolves once the response headers arrive with a
    /// success status; the body is left unread.
    async fn open_generation(&self, request: &GenerationRequest) -> Result<ByteStream>;

    /// `POST /generate-product-ads`.
    async fn generate_product_ads(&self, request: &AdImageRequest) -> Result<AdImageResponse>;
}
