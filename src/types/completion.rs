//! Text completion request and response types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use super::{Params, take_timeout};
use crate::error::BlockError;

/// A single `POST /completions` call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Prompt text
    pub prompt: String,
    /// Body parameters other than the prompt (`model`, `temperature`, ...)
    pub params: Params,
    /// Per-request timeout
    pub timeout: Option<Duration>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            params: Map::new(),
            timeout: None,
        }
    }

    /// Build a request from merged block parameters.
    ///
    /// `timeout` is lifted out of the body and `null` entries are dropped.
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

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Model id (the deployment id on Azure)
    pub fn model(&self) -> Option<&str> {
        self.params.get("model").and_then(Value::as_str)
    }

    /// JSON body sent on the wire.
    pub fn body(&self) -> Value {
        let mut body = self.params.clone();
        body.insert("prompt".to_string(), Value::String(self.prompt.clone()));
        Value::Object(body)
    }
}

/// Response of the completions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub id: Option<String>,
    pub object: Option<String>,
    pub created: Option<i64>,
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
    #[serde(default)]
    pub usage: Usage,
}

impl Completion {
    /// Text of the first ("best") choice
    pub fn text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub index: u32,
    pub logprobs: Option<Value>,
    pub finish_reason: Option<String>,
}

/// Token accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}
