//! Text generation request.

use bon::Builder;
use serde::{Deserialize, Serialize};

/// A base64-encoded image attached to a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// Base64 payload without any `data:` URL prefix.
    pub base64: String,
    /// MIME type, e.g. `image/png`.
    pub media_type: String,
}

/// One call to the streaming text-generation endpoint.
///
/// Example:
/// ```
/// use pitchcraft::types::GenerationRequest;
///
/// let request = GenerationRequest::builder()
///     .prompt("Write a tagline")
///     .system_prompt("You are a copywriter.")
///     .build();
/// assert!(request.image.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct GenerationRequest {
    #[builder(into)]
    pub prompt: String,
    #[builder(into)]
    pub system_prompt: String,
    pub image: Option<ImageData>,
}

/// Wire body for `POST {API_BASE}/claude`.
#[derive(Debug, Serialize)]
pub(crate) struct GenerationBody<'a> {
    prompt: &'a str,
    system_prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_base64: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_media_type: Option<&'a str>,
}

impl GenerationRequest {
    pub(crate) fn body(&self) -> GenerationBody<'_> {
        GenerationBody {
            prompt: &self.prompt,
            system_prompt: &self.system_prompt,
            image_base64: self.image.as_ref().map(|i| i.base64.as_str()),
            image_media_type: self.image.as_ref().map(|i| i.media_type.as_str()),
        }
    }
}
