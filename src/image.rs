//! Image generation model block

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::blocks::Block;
use crate::credentials::{CredentialsBlock, ModelCredentials};
use crate::error::BlockError;
use crate::runtime;
use crate::types::{ImageRequest, ImageResponse, ImageResponseFormat, ImageSize, Params};

fn default_n() -> u32 {
    1
}

/// A block that generates images from a prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageModel {
    pub credentials: ModelCredentials,
    #[serde(default)]
    pub size: ImageSize,
    /// Number of images to generate, between 1 and 10.
    #[serde(default = "default_n")]
    pub n: u32,
    #[serde(default)]
    pub response_format: ImageResponseFormat,
    /// Image model, e.g. `dall-e-3`. Required on Azure, where it names the
    /// deployment.
    #[serde(default)]
    pub model: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout: Option<f64>,
}

impl ImageModel {
    pub fn new(credentials: impl Into<ModelCredentials>) -> Self {
        Self {
            credentials: credentials.into(),
            size: ImageSize::default(),
            n: default_n(),
            response_format: ImageResponseFormat::default(),
            model: None,
            timeout: None,
        }
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_n(mut self, n: u32) -> Self {
        self.n = n;
        self
    }

    pub fn with_response_format(mut self, response_format: ImageResponseFormat) -> Self {
        self.response_format = response_format;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn validate(&self) -> Result<(), BlockError> {
        if !(1..=10).contains(&self.n) {
            return Err(BlockError::InvalidParameter(format!(
                "n must be between 1 and 10, got {}",
                self.n
            )));
        }
        if self.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err(BlockError::InvalidParameter(
                "model cannot be empty".to_string(),
            ));
        }
        if self.timeout.is_some_and(|t| !t.is_finite() || t <= 0.0) {
            return Err(BlockError::InvalidParameter(
                "timeout must be a positive number of seconds".to_string(),
            ));
        }
        Ok(())
    }

    /// Request parameters: block defaults first, `overrides` win on conflict.
    pub fn request_params(&self, overrides: &Params) -> Params {
        let mut params = Map::new();
        params.insert("size".to_string(), json!(self.size));
        params.insert("n".to_string(), json!(self.n));
        params.insert("response_format".to_string(), json!(self.response_format));
        params.insert("model".to_string(), json!(self.model));
        params.insert("timeout".to_string(), json!(self.timeout));
        params.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        params
    }

    pub async fn submit_prompt(&self, prompt: &str) -> Result<ImageResponse, BlockError> {
        self.submit_prompt_with(prompt, Params::new()).await
    }

    pub async fn submit_prompt_with(
        &self,
        prompt: &str,
        overrides: Params,
    ) -> Result<ImageResponse, BlockError> {
        self.validate()?;
        let request = ImageRequest::from_params(prompt, self.request_params(&overrides))?;
        let client = self.credentials.get_client()?;
        let response = client.create_image(&request).await?;

        let size = request
            .params
            .get("size")
            .and_then(Value::as_str)
            .unwrap_or(self.size.as_str());
        tracing::info!(
            block = Self::BLOCK_TYPE_NAME,
            "Finished image completion, creating {} {:?} image(s).",
            response.data.len(),
            size
        );
        Ok(response)
    }

    pub fn submit_prompt_blocking(&self, prompt: &str) -> Result<ImageResponse, BlockError> {
        runtime::block_on(self.submit_prompt(prompt))
    }

    pub fn submit_prompt_with_blocking(
        &self,
        prompt: &str,
        overrides: Params,
    ) -> Result<ImageResponse, BlockError> {
        runtime::block_on(self.submit_prompt_with(prompt, overrides))
    }
}

impl Block for ImageModel {
    const BLOCK_TYPE_NAME: &'static str = "OpenAI Image Model";
    const LOGO_URL: Option<&'static str> = Some(
        "https://cdn.sanity.io/images/3ugk85nk/production/760539393a7dbf93a143fb01c2a8b0fe7157a8d8-247x250.png",
    );
    const DOCUMENTATION_URL: Option<&'static str> =
        Some("https://platform.openai.com/docs/api-reference/images");

    fn to_document(&self) -> Result<Value, BlockError> {
        let mut data = serde_json::to_value(self)?;
        data["credentials"] = self.credentials.to_document()?;
        Ok(data)
    }
}
