//! Form input handed from the submitter to the results runner.

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::request::ImageData;
use crate::error::{GeneratorError, Result};

static DATA_URL: OnceLock<Regex> = OnceLock::new();

fn data_url_pattern() -> &'static Regex {
    DATA_URL.get_or_init(|| {
        Regex::new(r"^data:(.*?);base64,(.*)$").expect("data URL pattern is valid")
    })
}

/// Product details collected by the form.
///
/// Serialized with the same camelCase keys the form has always written, so a
/// record stored by one front end can be read by another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub title: String,
    pub description: String,
    pub audience: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_media_type: Option<String>,
}

impl FormInput {
    /// Build a validated input. Fields are trimmed and must be non-empty.
    pub fn new(
        title: impl AsRef<str>,
        description: impl AsRef<str>,
        audience: impl AsRef<str>,
    ) -> Result<Self> {
        let input = Self {
            title: title.as_ref().trim().to_string(),
            description: description.as_ref().trim().to_string(),
            audience: audience.as_ref().trim().to_string(),
            image_base64: None,
            image_media_type: None,
        };
        input.validate()?;
        Ok(input)
    }

    /// Attach an image given as a `data:<media>;base64,<payload>` URL.
    pub fn with_image_data_url(mut self, url: &str) -> Result<Self> {
        let captures = data_url_pattern()
            .captures(url.trim())
            .ok_or_else(|| GeneratorError::InvalidInput("Failed to process image.".into()))?;
        let media_type = captures.get(1).map_or("", |m| m.as_str());
        let payload = captures.get(2).map_or("", |m| m.as_str());
        if media_type.is_empty() || payload.is_empty() {
            return Err(GeneratorError::InvalidInput("Failed to process image.".into()));
        }
        self.image_media_type = Some(media_type.to_string());
        self.image_base64 = Some(payload.to_string());
        Ok(self)
    }

    /// Attach raw image bytes, encoding them as base64.
    pub fn with_image_bytes(mut self, bytes: &[u8], media_type: impl Into<String>) -> Self {
        self.image_base64 = Some(STANDARD.encode(bytes));
        self.image_media_type = Some(media_type.into());
        self
    }

    /// Check required fields. Records read back from storage go through this
    /// too, since another writer may have stored partial data.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("title", &self.title),
            ("description", &self.description),
            ("audience", &self.audience),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(GeneratorError::InvalidInput(format!(
                "Please fill out all required fields (missing: {})",
                missing.join(", ")
            )))
        }
    }

    /// The attached image, if both payload and media type are present.
    pub fn image(&self) -> Option<ImageData> {
        match (&self.image_base64, &self.image_media_type) {
            (Some(base64), Some(media_type)) => Some(ImageData {
                base64: base64.clone(),
                media_type: media_type.clone(),
            }),
            _ => None,
        }
    }

    /// Product string sent to the advice search.
    pub fn product_line(&self) -> String {
        format!("{} - {}", self.title, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_trims_and_validates() {
        let input = FormInput::new("  Mug ", "Ceramic", " Coffee fans\n").unwrap();
        assert_eq!(input.title, "Mug");
        assert_eq!(input.audience, "Coffee fans");
        assert_eq!(input.product_line(), "Mug - Ceramic");

        let err = FormInput::new("Mug", "   ", "").unwrap_err();
        assert!(err.to_string().contains("missing: description, audience"));
    }

    #[test]
    fn data_url_splits_media_type_and_payload() {
        let input = FormInput::new("Mug", "Ceramic", "Coffee fans")
            .unwrap()
            .with_image_data_url("data:image/jpeg;base64,/9j/4AAQ")
            .unwrap();
        assert_eq!(
            input.image(),
            Some(ImageData {
                base64: "/9j/4AAQ".into(),
                media_type: "image/jpeg".into(),
            })
        );
    }

    #[test]
    fn malformed_data_url_is_rejected() {
        let input = FormInput::new("Mug", "Ceramic", "Coffee fans").unwrap();
        assert!(input.clone().with_image_data_url("not a url").is_err());
        assert!(input.with_image_data_url("data:;base64,").is_err());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let input = FormInput::new("Mug", "Ceramic", "Coffee fans")
            .unwrap()
            .with_image_bytes(b"hi", "image/png");
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["imageBase64"], "aGk=");
        assert_eq!(json["imageMediaType"], "image/png");

        let back: FormInput = serde_json::from_value(json).unwrap();
        assert_eq!(back, input);
    }

    #[test]
    fn image_requires_both_halves() {
        let mut input = FormInput::new("Mug", "Ceramic", "Coffee fans").unwrap();
        input.image_base64 = Some("aGk=".into());
        assert!(input.image().is_none());
    }
}
