//! Environment-driven settings.

use std::path::PathBuf;

/// Directory of the file block store.
pub const HOME_ENV: &str = "OPENAI_BLOCKS_HOME";
pub const DEFAULT_HOME: &str = ".openai-blocks";

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const OPENAI_ORGANIZATION_ENV: &str = "OPENAI_ORGANIZATION";
pub const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const AZURE_OPENAI_API_KEY_ENV: &str = "AZURE_OPENAI_API_KEY";
pub const AZURE_OPENAI_ENDPOINT_ENV: &str = "AZURE_OPENAI_ENDPOINT";
pub const OPENAI_API_VERSION_ENV: &str = "OPENAI_API_VERSION";

/// Where blocks are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub home: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            home: PathBuf::from(DEFAULT_HOME),
        }
    }
}

impl StoreSettings {
    /// Read `OPENAI_BLOCKS_HOME`, falling back to `.openai-blocks`.
    pub fn from_env() -> Self {
        match env_non_empty(HOME_ENV) {
            Some(home) => Self {
                home: PathBuf::from(home),
            },
            None => Self::default(),
        }
    }
}

/// Value of an environment variable, ignoring unset and blank values.
pub(crate) fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
