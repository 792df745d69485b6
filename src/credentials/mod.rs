//! Credential blocks.
//!
//! Both variants resolve into the same [`OpenAiClient`] surface. Resolution
//! happens at the point of use and performs no network I/O.

mod azure;
mod openai;

pub use azure::{AzureOpenAiCredentials, DEFAULT_API_VERSION};
pub use openai::OpenAiCredentials;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blocks::Block;
use crate::client::OpenAiClient;
use crate::error::BlockError;

/// A block that can produce an authenticated client.
pub trait CredentialsBlock {
    fn get_client(&self) -> Result<OpenAiClient, BlockError>;
}

/// Credentials embedded in a model block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelCredentials {
    #[serde(rename = "openai")]
    OpenAi(OpenAiCredentials),
    Azure(AzureOpenAiCredentials),
}

impl ModelCredentials {
    /// Persistable form, including the plaintext secret.
    pub fn to_document(&self) -> Result<Value, BlockError> {
        let (tag, mut data) = match self {
            Self::OpenAi(c) => ("openai", c.to_document()?),
            Self::Azure(c) => ("azure", c.to_document()?),
        };
        data["type"] = Value::String(tag.to_string());
        Ok(data)
    }
}

impl CredentialsBlock for ModelCredentials {
    fn get_client(&self) -> Result<OpenAiClient, BlockError> {
        match self {
            Self::OpenAi(c) => c.get_client(),
            Self::Azure(c) => c.get_client(),
        }
    }
}

impl From<OpenAiCredentials> for ModelCredentials {
    fn from(value: OpenAiCredentials) -> Self {
        Self::OpenAi(value)
    }
}

impl From<AzureOpenAiCredentials> for ModelCredentials {
    fn from(value: AzureOpenAiCredentials) -> Self {
        Self::Azure(value)
    }
}
