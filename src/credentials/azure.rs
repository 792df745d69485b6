//! Credentials used to authenticate with Azure OpenAI.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::CredentialsBlock;
use crate::auth::{TokenProvider, token_provider};
use crate::blocks::Block;
use crate::client::OpenAiClient;
use crate::error::BlockError;
use crate::settings::{
    AZURE_OPENAI_API_KEY_ENV, AZURE_OPENAI_ENDPOINT_ENV, OPENAI_API_VERSION_ENV, env_non_empty,
};
use crate::types::HttpConfig;
use crate::utils::secret::{deserialize_secret, serialize_masked};

pub const DEFAULT_API_VERSION: &str = "2023-12-01-preview";

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

/// Credentials for an Azure OpenAI resource.
///
/// Requests are routed to `{azure_endpoint}/openai/deployments/{model}/...`,
/// so the model configured on a block is the deployment id.
#[derive(Clone, Serialize, Deserialize)]
pub struct AzureOpenAiCredentials {
    #[serde(
        serialize_with = "serialize_masked",
        deserialize_with = "deserialize_secret"
    )]
    pub api_key: SecretString,
    /// The API version of the Azure OpenAI model.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// The Azure endpoint URL, e.g. `https://my-resource.openai.azure.com`.
    pub azure_endpoint: String,
    /// When set, requests authenticate with an Azure AD bearer token instead
    /// of the `api-key` header. Not persisted; see
    /// [`azure_ad_token_provider_name`](Self::azure_ad_token_provider_name).
    #[serde(skip)]
    pub azure_ad_token_provider: Option<Arc<dyn TokenProvider>>,
    /// Name of a provider in the token provider registry. Persisted, and
    /// resolved when a client is built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_ad_token_provider_name: Option<String>,
    #[serde(default)]
    pub http_config: HttpConfig,
}

impl std::fmt::Debug for AzureOpenAiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAiCredentials")
            .field("api_key", &"**********")
            .field("api_version", &self.api_version)
            .field("azure_endpoint", &self.azure_endpoint)
            .field(
                "has_azure_ad_token_provider",
                &self.azure_ad_token_provider.is_some(),
            )
            .field(
                "azure_ad_token_provider_name",
                &self.azure_ad_token_provider_name,
            )
            .finish()
    }
}

impl AzureOpenAiCredentials {
    pub fn new(api_key: impl Into<String>, azure_endpoint: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            api_version: default_api_version(),
            azure_endpoint: azure_endpoint.into(),
            azure_ad_token_provider: None,
            azure_ad_token_provider_name: None,
            http_config: HttpConfig::default(),
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_azure_ad_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.azure_ad_token_provider = Some(provider);
        self
    }

    /// Authenticate with the provider registered under `name`. Unlike
    /// [`with_azure_ad_token_provider`](Self::with_azure_ad_token_provider),
    /// this survives saving the block.
    pub fn with_registered_token_provider(mut self, name: impl Into<String>) -> Self {
        self.azure_ad_token_provider_name = Some(name.into());
        self
    }

    fn uses_token_provider(&self) -> bool {
        self.azure_ad_token_provider.is_some() || self.azure_ad_token_provider_name.is_some()
    }

    fn resolve_token_provider(&self) -> Result<Option<Arc<dyn TokenProvider>>, BlockError> {
        if let Some(provider) = &self.azure_ad_token_provider {
            return Ok(Some(provider.clone()));
        }
        self.azure_ad_token_provider_name
            .as_deref()
            .map(token_provider)
            .transpose()
    }

    pub fn with_http_config(mut self, http_config: HttpConfig) -> Self {
        self.http_config = http_config;
        self
    }

    /// Build from `AZURE_OPENAI_API_KEY`, `AZURE_OPENAI_ENDPOINT` and
    /// `OPENAI_API_VERSION`.
    pub fn from_env() -> Result<Self, BlockError> {
        let api_key = env_non_empty(AZURE_OPENAI_API_KEY_ENV).ok_or_else(|| {
            BlockError::MissingApiKey(format!("{AZURE_OPENAI_API_KEY_ENV} is not set"))
        })?;
        let endpoint = env_non_empty(AZURE_OPENAI_ENDPOINT_ENV).ok_or_else(|| {
            BlockError::ConfigurationError(format!("{AZURE_OPENAI_ENDPOINT_ENV} is not set"))
        })?;
        let mut credentials = Self::new(api_key, endpoint);
        if let Some(version) = env_non_empty(OPENAI_API_VERSION_ENV) {
            credentials.api_version = version;
        }
        Ok(credentials)
    }

    pub fn validate(&self) -> Result<(), BlockError> {
        if !self.uses_token_provider() && self.api_key.expose_secret().trim().is_empty() {
            return Err(BlockError::MissingApiKey(
                "Azure OpenAI api_key cannot be empty".to_string(),
            ));
        }
        if self.azure_endpoint.trim().is_empty() {
            return Err(BlockError::ConfigurationError(
                "Azure OpenAI azure_endpoint cannot be empty".to_string(),
            ));
        }
        if self.api_version.trim().is_empty() {
            return Err(BlockError::ConfigurationError(
                "Azure OpenAI api_version cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl CredentialsBlock for AzureOpenAiCredentials {
    fn get_client(&self) -> Result<OpenAiClient, BlockError> {
        self.validate()?;
        let provider = self.resolve_token_provider()?;
        let http_client = self.http_config.build_client()?;
        Ok(OpenAiClient::azure(
            self.api_key.clone(),
            self.azure_endpoint.clone(),
            self.api_version.clone(),
            provider,
            http_client,
        ))
    }
}

impl Block for AzureOpenAiCredentials {
    const BLOCK_TYPE_NAME: &'static str = "Azure OpenAI Credentials";
    const LOGO_URL: Option<&'static str> = Some(
        "https://cdn.sanity.io/images/3ugk85nk/production/760539393a7dbf93a143fb01c2a8b0fe7157a8d8-247x250.png",
    );

    fn to_document(&self) -> Result<Value, BlockError> {
        if self.azure_ad_token_provider.is_some() && self.azure_ad_token_provider_name.is_none() {
            return Err(BlockError::ConfigurationError(
                "an in-memory Azure AD token provider cannot be saved; register it and use \
                 with_registered_token_provider"
                    .to_string(),
            ));
        }
        let mut data = serde_json::to_value(self)?;
        data["api_key"] = Value::String(self.api_key.expose_secret().to_owned());
        Ok(data)
    }
}
