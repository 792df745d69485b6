//! Image generation request and response types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

use super::{Params, take_timeout};
use crate::error::BlockError;

/// Size of the generated images
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageSize {
    #[default]
    #[serde(rename = "256x256")]
    Small,
    #[serde(rename = "512x512")]
    Medium,
    #[serde(rename = "1024x1024")]
    Large,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "256x256",
            Self::Medium => "512x512",
            Self::Large => "1024x1024",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How generated images are returned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageResponseFormat {
    /// Hosted URLs
    #[default]
    Url,
    /// Inline base64 data
    B64Json,
}

impl ImageResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::B64Json => "b64_json",
        }
    }
}

/// A single `POST /images/generations` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
    pub params: Params,
    pub timeout: Option<Duration>,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            params: Map::new(),
            timeout: None,
        }
    }

    /// Build a request from merged block parameters.
    pub fn from_params(prompt: impl Into<String>, mut params: Params) -> Result<Self, BlockError> {
        let timeout = take_timeout(&mut params)?;
        params.retain(|_, v| !v.is_null());
        params.remove("prompt");
        Ok(Self {
            prompt: prompt.into(),
            params,
            timeout,
        })
    }

    pub fn model(&self) -> Option<&str> {
        self.params.get("model").and_then(Value::as_str)
    }

    /// Number of images requested (defaults to 1 like the API)
    pub fn count(&self) -> u64 {
        self.params.get("n").and_then(Value::as_u64).unwrap_or(1)
    }

    pub fn body(&self) -> Value {
        let mut body = self.params.clone();
        body.insert("prompt".to_string(), Value::String(self.prompt.clone()));
        Value::Object(body)
    }
}

/// Response of the image generation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageResponse {
    pub created: Option<i64>,
    #[serde(default)]
    pub data: Vec<GeneratedImage>,
}

impl ImageResponse {
    pub fn urls(&self) -> Vec<&str> {
        self.data.iter().filter_map(|d| d.url.as_deref()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub url: Option<String>,
    pub b64_json: Option<String>,
    pub revised_prompt: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn size_and_format_use_wire_names() {
        assert_eq!(serde_json::to_value(ImageSize::Large).unwrap(), "1024x1024");
        assert_eq!(
            serde_json::to_value(ImageResponseFormat::B64Json).unwrap(),
            "b64_json"
        );
        let size: ImageSize = serde_json::from_value(json!("512x512")).unwrap();
        assert_eq!(size, ImageSize::Medium);
        assert!(serde_json::from_value::<ImageSize>(json!("640x480")).is_err());
    }

    #[test]
    fn response_collects_urls() {
        let resp: ImageResponse = serde_json::from_value(json!({
            "created": 1,
            "data": [{"url": "https://a"}, {"b64_json": "AAAA"}, {"url": "https://b"}]
        }))
        .unwrap();
        assert_eq!(resp.urls(), vec!["https://a", "https://b"]);
    }
}
