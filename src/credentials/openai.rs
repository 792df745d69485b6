//! Credentials used to authenticate with OpenAI.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::CredentialsBlock;
use crate::blocks::Block;
use crate::client::{DEFAULT_BASE_URL, OpenAiClient};
use crate::error::BlockError;
use crate::settings::{
    OPENAI_API_KEY_ENV, OPENAI_BASE_URL_ENV, OPENAI_ORGANIZATION_ENV, env_non_empty,
};
use crate::types::HttpConfig;
use crate::utils::secret::{deserialize_secret, serialize_masked};

/// Credentials used to authenticate with OpenAI.
///
/// ```rust,ignore
/// let credentials: OpenAiCredentials = store.load_block("my-openai-creds").await?;
/// let client = credentials.get_client()?;
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiCredentials {
    /// The API key used to authenticate with OpenAI.
    #[serde(
        serialize_with = "serialize_masked",
        deserialize_with = "deserialize_secret"
    )]
    pub api_key: SecretString,
    /// Specify which organization is used for an API request.
    #[serde(default)]
    pub organization: Option<String>,
    /// Override of `https://api.openai.com/v1`
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub http_config: HttpConfig,
}

impl std::fmt::Debug for OpenAiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCredentials")
            .field("api_key", &"**********")
            .field("has_organization", &self.organization.is_some())
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAiCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            organization: None,
            base_url: None,
            http_config: HttpConfig::default(),
        }
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_http_config(mut self, http_config: HttpConfig) -> Self {
        self.http_config = http_config;
        self
    }

    /// Build from `OPENAI_API_KEY`, `OPENAI_ORGANIZATION` and `OPENAI_BASE_URL`.
    pub fn from_env() -> Result<Self, BlockError> {
        let api_key = env_non_empty(OPENAI_API_KEY_ENV).ok_or_else(|| {
            BlockError::MissingApiKey(format!("{OPENAI_API_KEY_ENV} is not set"))
        })?;
        let mut credentials = Self::new(api_key);
        credentials.organization = env_non_empty(OPENAI_ORGANIZATION_ENV);
        credentials.base_url = env_non_empty(OPENAI_BASE_URL_ENV);
        Ok(credentials)
    }

    pub fn validate(&self) -> Result<(), BlockError> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(BlockError::MissingApiKey(
                "OpenAI api_key cannot be empty".to_string(),
            ));
        }
        if self.base_url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err(BlockError::ConfigurationError(
                "OpenAI base_url cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl CredentialsBlock for OpenAiCredentials {
    fn get_client(&self) -> Result<OpenAiClient, BlockError> {
        self.validate()?;
        let http_client = self.http_config.build_client()?;
        Ok(OpenAiClient::openai(
            self.api_key.clone(),
            self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
            self.organization.clone(),
            http_client,
        ))
    }
}

impl Block for OpenAiCredentials {
    const BLOCK_TYPE_NAME: &'static str = "OpenAI Credentials";
    const LOGO_URL: Option<&'static str> = Some(
        "https://cdn.sanity.io/images/3ugk85nk/production/760539393a7dbf93a143fb01c2a8b0fe7157a8d8-247x250.png",
    );

    fn to_document(&self) -> Result<Value, BlockError> {
        let mut data = serde_json::to_value(self)?;
        data["api_key"] = Value::String(self.api_key.expose_secret().to_owned());
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ENV_LOCK, EnvGuard};

    #[test]
    fn serialization_masks_key_but_document_keeps_it() {
        let creds = OpenAiCredentials::new("sk-live").with_organization("org-9");
        let shown = serde_json::to_string(&creds).unwrap();
        assert!(!shown.contains("sk-live"));
        assert!(shown.contains("**********"));
        assert!(!format!("{creds:?}").contains("sk-live"));

        let doc = creds.to_document().unwrap();
        assert_eq!(doc["api_key"], "sk-live");
        let back = OpenAiCredentials::from_document(doc).unwrap();
        assert_eq!(back.api_key.expose_secret(), "sk-live");
        assert_eq!(back.organization.as_deref(), Some("org-9"));
    }

    #[test]
    fn empty_key_is_rejected_at_client_resolution() {
        let err = OpenAiCredentials::new("  ").get_client().unwrap_err();
        assert!(matches!(err, BlockError::MissingApiKey(_)));
    }

    #[test]
    fn get_client_targets_configured_base_url() {
        let client = OpenAiCredentials::new("sk")
            .with_base_url("http://localhost:1234/v1")
            .get_client()
            .unwrap();
        assert!(!client.is_azure());
        assert_eq!(
            client.url_for("completions", None).unwrap(),
            "http://localhost:1234/v1/completions"
        );
    }

    #[test]
    fn from_env_reads_key_and_organization() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let _k = EnvGuard::set(OPENAI_API_KEY_ENV, "sk-env");
        let _o = EnvGuard::set(OPENAI_ORGANIZATION_ENV, "org-env");
        let _b = EnvGuard::remove(OPENAI_BASE_URL_ENV);

        let creds = OpenAiCredentials::from_env().unwrap();
        assert_eq!(creds.api_key.expose_secret(), "sk-env");
        assert_eq!(creds.organization.as_deref(), Some("org-env"));
        assert_eq!(creds.base_url, None);
    }

    #[test]
    fn from_env_without_key_fails() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let _k = EnvGuard::remove(OPENAI_API_KEY_ENV);
        assert!(matches!(
            OpenAiCredentials::from_env(),
            Err(BlockError::MissingApiKey(_))
        ));
    }
}
