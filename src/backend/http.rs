//! HTTP backend over a shared reqwest client.

use std::sync::OnceLock;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use tracing::debug;

use super::{ByteStream, MarketingBackend};
use crate::config::GeneratorConfig;
use crate::error::{GeneratorError, Result};
use crate::types::{AdImageRequest, AdImageResponse, AdviceRequest, GenerationRequest};

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
///
/// No client-wide timeout: streamed generations can legitimately run for
/// minutes, so limits are applied per call from [`GeneratorConfig`].
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client")
    })
}

fn json_headers(accept: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static(accept));
    headers
}

/// A connection that never produced a response.
fn connect_error(err: reqwest::Error) -> GeneratorError {
    GeneratorError::Transport {
        status: None,
        status_text: err.to_string(),
    }
}

/// Talks to the marketing backend at a configured base URL.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self::with_base_url(config.api_base_url.clone())
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: shared_client().clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }
}

#[async_trait]
impl MarketingBackend for HttpBackend {
    async fn search_selling_advice(&self, request: &AdviceRequest) -> Result<serde_json::Value> {
        let url = self.url("search-selling-advice");
        debug!(%url, search_limit = request.search_limit, "searching selling advice");

        let resp = self
            .client
            .post(&url)
            .headers(json_headers("application/json"))
            .json(request)
            .send()
            .await
            .map_err(connect_error)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GeneratorError::AdviceFetch {
                status: status.as_u16(),
                message: if body.is_empty() {
                    status.canonical_reason().unwrap_or("unknown status").to_string()
                } else {
                    body
                },
            });
        }

        Ok(resp.json().await?)
    }

    async fn open_generation(&self, request: &GenerationRequest) -> Result<ByteStream> {
        let url = self.url("claude");
        debug!(
            %url,
            prompt_len = request.prompt.len(),
            has_image = request.image.is_some(),
            "opening generation stream"
        );

        let resp = self
            .client
            .post(&url)
            .headers(json_headers("text/event-stream"))
            .json(&request.body())
            .send()
            .await
            .map_err(connect_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GeneratorError::status(status));
        }

        Ok(resp
            .bytes_stream()
            .map(|chunk| chunk.map_err(GeneratorError::Network))
            .boxed())
    }

    async fn generate_product_ads(&self, request: &AdImageRequest) -> Result<AdImageResponse> {
        let url = self.url("generate-product-ads");
        debug!(%url, num_prompts = request.num_prompts, "requesting ad images");

        let resp = self
            .client
            .post(&url)
            .headers(json_headers("application/json"))
            .json(request)
            .send()
            .await
            .map_err(connect_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GeneratorError::status(status));
        }

        Ok(resp.json().await?)
    }
}
