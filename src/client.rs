//! `OpenAI` Client Implementation
//!
//! The handle returned by credentials blocks. It owns its `reqwest::Client`
//! and the resolved secret; building one performs no I/O. Every operation is
//! exactly one HTTP request.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenProvider;
use crate::error::BlockError;
use crate::types::{Completion, CompletionRequest, ImageRequest, ImageResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Clone)]
enum Endpoint {
    OpenAi {
        base_url: String,
        organization: Option<String>,
    },
    Azure {
        endpoint: String,
        api_version: String,
        token_provider: Option<Arc<dyn TokenProvider>>,
    },
}

/// Ready-to-use API handle.
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: SecretString,
    endpoint: Endpoint,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug_struct = f.debug_struct("OpenAiClient");
        match &self.endpoint {
            Endpoint::OpenAi {
                base_url,
                organization,
            } => {
                debug_struct
                    .field("provider", &"openai")
                    .field("base_url", base_url)
                    .field("has_organization", &organization.is_some());
            }
            Endpoint::Azure {
                endpoint,
                api_version,
                token_provider,
            } => {
                debug_struct
                    .field("provider", &"azure")
                    .field("endpoint", endpoint)
                    .field("api_version", api_version)
                    .field("has_token_provider", &token_provider.is_some());
            }
        }
        debug_struct.finish()
    }
}

impl OpenAiClient {
    /// Handle for api.openai.com (or a compatible base URL).
    pub fn openai(
        api_key: SecretString,
        base_url: impl Into<String>,
        organization: Option<String>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            api_key,
            endpoint: Endpoint::OpenAi {
                base_url: base_url.into().trim_end_matches('/').to_string(),
                organization,
            },
            http_client,
        }
    }

    /// Handle for an Azure OpenAI resource.
    pub fn azure(
        api_key: SecretString,
        endpoint: impl Into<String>,
        api_version: impl Into<String>,
        token_provider: Option<Arc<dyn TokenProvider>>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            api_key,
            endpoint: Endpoint::Azure {
                endpoint: endpoint.into().trim_end_matches('/').to_string(),
                api_version: api_version.into(),
                token_provider,
            },
            http_client,
        }
    }

    pub fn is_azure(&self) -> bool {
        matches!(self.endpoint, Endpoint::Azure { .. })
    }

    /// Build the URL for `operation` (e.g. `completions`, `images/generations`).
    ///
    /// Azure routes by deployment, so `model` is mandatory there.
    pub fn url_for(&self, operation: &str, model: Option<&str>) -> Result<String, BlockError> {
        match &self.endpoint {
            Endpoint::OpenAi { base_url, .. } => Ok(format!("{base_url}/{operation}")),
            Endpoint::Azure {
                endpoint,
                api_version,
                ..
            } => {
                let deployment = model.filter(|m| !m.trim().is_empty()).ok_or_else(|| {
                    BlockError::InvalidParameter(
                        "Azure OpenAI requests need a model (deployment id)".to_string(),
                    )
                })?;
                Ok(format!(
                    "{endpoint}/openai/deployments/{}/{operation}?api-version={}",
                    urlencoding::encode(deployment),
                    urlencoding::encode(api_version)
                ))
            }
        }
    }

    async fn headers(&self) -> Result<HeaderMap, BlockError> {
        let mut headers = HeaderMap::new();
        match &self.endpoint {
            Endpoint::OpenAi { organization, .. } => {
                headers.insert(
                    AUTHORIZATION,
                    bearer(self.api_key.expose_secret())?,
                );
                if let Some(org) = organization {
                    headers.insert(
                        "OpenAI-Organization",
                        HeaderValue::from_str(org).map_err(|e| {
                            BlockError::InvalidParameter(format!("Invalid organization header: {e}"))
                        })?,
                    );
                }
            }
            Endpoint::Azure { token_provider, .. } => match token_provider {
                Some(provider) => {
                    let token = provider.token().await?;
                    headers.insert(AUTHORIZATION, bearer(token.expose_secret())?);
                }
                None => {
                    let mut value = HeaderValue::from_str(self.api_key.expose_secret())
                        .map_err(|e| {
                            BlockError::InvalidParameter(format!(
                                "Invalid Azure api-key header: {e}"
                            ))
                        })?;
                    value.set_sensitive(true);
                    headers.insert("api-key", value);
                }
            },
        }
        Ok(headers)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: String,
        body: &Value,
        timeout: Option<Duration>,
    ) -> Result<T, BlockError> {
        let headers = self.headers().await?;
        let mut builder = self.http_client.post(url).headers(headers).json(body);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let resp = builder.send().await.map_err(BlockError::from_transport)?;
        let status = resp.status();
        let text = resp.text().await.map_err(BlockError::from_transport)?;
        if !status.is_success() {
            return Err(BlockError::from_response(status.as_u16(), &text));
        }
        serde_json::from_str(&text).map_err(|e| BlockError::ParseError(e.to_string()))
    }

    /// `POST /completions`
    pub async fn create_completion(
        &self,
        request: &CompletionRequest,
    ) -> Result<Completion, BlockError> {
        let url = self.url_for("completions", request.model())?;
        tracing::debug!(model = ?request.model(), "creating text completion");
        self.post_json(url, &request.body(), request.timeout).await
    }

    /// `POST /images/generations`
    pub async fn create_image(&self, request: &ImageRequest) -> Result<ImageResponse, BlockError> {
        let url = self.url_for("images/generations", request.model())?;
        tracing::debug!(count = request.count(), "creating image");
        self.post_json(url, &request.body(), request.timeout).await
    }
}

fn bearer(token: &str) -> Result<HeaderValue, BlockError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| BlockError::InvalidParameter(format!("Invalid authorization header: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}
