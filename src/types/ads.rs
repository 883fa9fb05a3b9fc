//! Advice search and ad image wire types.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::{GeneratorError, Result};

/// Body for `POST {API_BASE}/search-selling-advice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceRequest {
    pub product: String,
    pub target_audience: String,
    pub search_limit: u32,
}

/// Body for `POST {API_BASE}/generate-product-ads`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdImageRequest {
    pub product_description: String,
    pub product_image: Option<String>,
    pub target_audience: String,
    pub ad_style: String,
    pub num_prompts: u32,
}

/// Response from the ad image endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdImageResponse {
    /// Base64 PNG payloads.
    #[serde(default)]
    pub generated_ads: Vec<String>,
}

/// Decode one generated ad into raw image bytes.
///
/// Accepts a bare base64 payload or a full `data:image/png;base64,` URL.
pub fn decode_ad(encoded: &str) -> Result<Vec<u8>> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    };
    STANDARD
        .decode(payload.trim())
        .map_err(|e| GeneratorError::InvalidInput(format!("Generated ad is not valid base64: {e}")))
}
