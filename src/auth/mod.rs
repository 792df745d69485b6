//! Authentication helpers and token providers.
//! This module defines a minimal trait to supply Azure AD Bearer tokens.

use crate::error::BlockError;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

/// An async Bearer token provider.
///
/// Implementations should cache tokens internally and refresh them when
/// necessary; the client asks for a token once per request.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns an access token string suitable for the `Authorization: Bearer <token>` header.
    async fn token(&self) -> Result<SecretString, BlockError>;
}

/// A simple static token provider useful for tests and basic scenarios where
/// the token is managed externally.
pub struct StaticTokenProvider {
    token: SecretString,
}

impl StaticTokenProvider {
    /// Create a new static token provider.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<SecretString, BlockError> {
        Ok(SecretString::from(self.token.expose_secret().to_owned()))
    }
}

type ProviderMap = HashMap<String, Arc<dyn TokenProvider>>;

static TOKEN_PROVIDERS: OnceLock<Mutex<ProviderMap>> = OnceLock::new();

fn token_providers() -> &'static Mutex<ProviderMap> {
    TOKEN_PROVIDERS.get_or_init(|| Mutex::new(HashMap::new()))
}

fn lock_providers() -> Result<std::sync::MutexGuard<'static, ProviderMap>, BlockError> {
    token_providers().lock().map_err(|_| {
        BlockError::ConfigurationError("Failed to lock token provider registry".to_string())
    })
}

/// Register a token provider under `name`, replacing any previous one.
///
/// Persisted credentials refer to providers by name; the process that loads
/// them must register the same name before building a client.
pub fn register_token_provider(
    name: impl Into<String>,
    provider: Arc<dyn TokenProvider>,
) -> Result<(), BlockError> {
    let name = name.into();
    if name.trim().is_empty() {
        return Err(BlockError::InvalidParameter(
            "token provider name cannot be empty".to_string(),
        ));
    }
    lock_providers()?.insert(name, provider);
    Ok(())
}

/// Remove a registered provider, returning it if it was present.
pub fn unregister_token_provider(
    name: &str,
) -> Result<Option<Arc<dyn TokenProvider>>, BlockError> {
    Ok(lock_providers()?.remove(name))
}

/// Look up a provider registered with [`register_token_provider`].
pub fn token_provider(name: &str) -> Result<Arc<dyn TokenProvider>, BlockError> {
    lock_providers()?.get(name).cloned().ok_or_else(|| {
        BlockError::ConfigurationError(format!("Token provider '{name}' is not registered"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_provider_returns_token_without_leaking_debug() {
        let provider = StaticTokenProvider::new("aad-token");
        let token = provider.token().await.unwrap();
        assert_eq!(token.expose_secret(), "aad-token");
        assert!(!format!("{provider:?}").contains("aad-token"));
    }

    #[tokio::test]
    async fn registered_provider_is_resolved_by_name() {
        let name = "auth-tests-registry";
        register_token_provider(name, Arc::new(StaticTokenProvider::new("first"))).unwrap();
        register_token_provider(name, Arc::new(StaticTokenProvider::new("second"))).unwrap();

        let token = token_provider(name).unwrap().token().await.unwrap();
        assert_eq!(token.expose_secret(), "second");

        assert!(unregister_token_provider(name).unwrap().is_some());
        assert!(matches!(
            token_provider(name),
            Err(BlockError::ConfigurationError(_))
        ));
        assert!(matches!(
            register_token_provider(" ", Arc::new(StaticTokenProvider::new("t"))),
            Err(BlockError::InvalidParameter(_))
        ));
    }
}
