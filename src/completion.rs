//! Text completion model block

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::blocks::Block;
use crate::credentials::{CredentialsBlock, ModelCredentials};
use crate::error::BlockError;
use crate::model_constants;
use crate::runtime;
use crate::types::{Completion, CompletionRequest, Params};

fn default_model() -> String {
    model_constants::completion::DEFAULT.to_string()
}

fn default_temperature() -> f64 {
    0.5
}

fn default_max_tokens() -> u32 {
    16
}

/// A block that submits prompts to the OpenAI completions endpoint.
///
/// ```rust,ignore
/// let model = CompletionModel::new(OpenAiCredentials::new("sk-..."))
///     .with_model("gpt-3.5-turbo-instruct");
/// let completion = model.submit_prompt("Say hello").await?;
/// println!("{:?}", completion.text());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionModel {
    pub credentials: ModelCredentials,
    /// ID of the model to use (the deployment id on Azure).
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature, between 0 and 2.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Maximum number of tokens to generate.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Suffix that comes after a completion of inserted text.
    #[serde(default)]
    pub suffix: Option<String>,
    /// Echo back the prompt in addition to the completion.
    #[serde(default)]
    pub echo: bool,
    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout: Option<f64>,
}

impl CompletionModel {
    pub fn new(credentials: impl Into<ModelCredentials>) -> Self {
        Self {
            credentials: credentials.into(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            suffix: None,
            echo: false,
            timeout: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn validate(&self) -> Result<(), BlockError> {
        if self.model.trim().is_empty() {
            return Err(BlockError::InvalidParameter(
                "model cannot be empty".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(BlockError::InvalidParameter(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(BlockError::InvalidParameter(
                "max_tokens must be at least 1".to_string(),
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
        params.insert("model".to_string(), json!(self.model));
        params.insert("temperature".to_string(), json!(self.temperature));
        params.insert("max_tokens".to_string(), json!(self.max_tokens));
        params.insert("suffix".to_string(), json!(self.suffix));
        params.insert("echo".to_string(), json!(self.echo));
        params.insert("timeout".to_string(), json!(self.timeout));
        for (key, value) in overrides {
            params.insert(key.clone(), value.clone());
        }
        params
    }

    pub async fn submit_prompt(&self, prompt: &str) -> Result<Completion, BlockError> {
        self.submit_prompt_with(prompt, Params::new()).await
    }

    /// Submit `prompt`, overriding any of the block's request parameters.
    pub async fn submit_prompt_with(
        &self,
        prompt: &str,
        overrides: Params,
    ) -> Result<Completion, BlockError> {
        self.validate()?;
        let request = CompletionRequest::from_params(prompt, self.request_params(&overrides))?;
        let client = self.credentials.get_client()?;
        let completion = client.create_completion(&request).await?;

        tracing::info!(
            block = Self::BLOCK_TYPE_NAME,
            "Finished text completion using the {:?} model with {} tokens, creating {} choice(s).",
            request.model().unwrap_or_default(),
            completion.usage.total_tokens,
            completion.choices.len()
        );
        Ok(completion)
    }

    pub fn submit_prompt_blocking(&self, prompt: &str) -> Result<Completion, BlockError> {
        runtime::block_on(self.submit_prompt(prompt))
    }

    pub fn submit_prompt_with_blocking(
        &self,
        prompt: &str,
        overrides: Params,
    ) -> Result<Completion, BlockError> {
        runtime::block_on(self.submit_prompt_with(prompt, overrides))
    }
}

impl Block for CompletionModel {
    const BLOCK_TYPE_NAME: &'static str = "OpenAI Completion Model";
    const LOGO_URL: Option<&'static str> = Some(
        "https://cdn.sanity.io/images/3ugk85nk/production/760539393a7dbf93a143fb01c2a8b0fe7157a8d8-247x250.png",
    );
    const DOCUMENTATION_URL: Option<&'static str> =
        Some("https://platform.openai.com/docs/api-reference/completions");

    fn to_document(&self) -> Result<Value, BlockError> {
        let mut data = serde_json::to_value(self)?;
        data["credentials"] = self.credentials.to_document()?;
        Ok(data)
    }
}
