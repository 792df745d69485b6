//! Error Handling Module
//!
//! A single error type covers block storage, credential resolution and the
//! HTTP calls made on behalf of a block.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_blocks::error::BlockError;
//!
//! let error = BlockError::from_response(404, r#"{"error":{"message":"no such model"}}"#);
//! assert_eq!(error.status_code(), Some(404));
//! ```

use thiserror::Error;

/// Errors produced by blocks, stores and the OpenAI client.
#[derive(Error, Debug)]
pub enum BlockError {
    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A parameter failed validation
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No API key could be resolved
    #[error("Missing API key: {0}")]
    MissingApiKey(String),

    /// The API was used in a way it does not support
    #[error("Usage error: {0}")]
    UsageError(String),

    /// No block document is stored under the requested name
    #[error("Unable to find block document named {name} for block type {block_type}")]
    BlockNotFound { block_type: String, name: String },

    /// A block document already exists and overwrite was not requested
    #[error("Block document named {name} of type {block_type} already exists")]
    BlockAlreadyExists { block_type: String, name: String },

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The request did not finish in time
    #[error("Request timed out: {0}")]
    TimeoutError(String),

    /// 401 / 403 from the API
    #[error("Authentication failed ({code}): {message}")]
    AuthenticationError { code: u16, message: String },

    /// 429 from the API
    #[error("Rate limit exceeded: {0}")]
    RateLimitError(String),

    /// Any other non-success response
    #[error("API error {code}: {message}")]
    ApiError {
        code: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// The response body could not be understood
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BlockError {
    /// Build an error from a non-success HTTP status and the raw response body.
    ///
    /// OpenAI-style bodies (`{"error": {"message": ..}}`) contribute their
    /// message; anything else is kept verbatim.
    pub fn from_response(code: u16, body: &str) -> Self {
        let details = serde_json::from_str::<serde_json::Value>(body).ok();
        let message = details
            .as_ref()
            .and_then(|v| v.get("error"))
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string());

        match code {
            401 | 403 => Self::AuthenticationError { code, message },
            429 => Self::RateLimitError(message),
            _ => Self::ApiError {
                code,
                message,
                details,
            },
        }
    }

    /// Map a `reqwest` transport error.
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::TimeoutError(error.to_string())
        } else {
            Self::HttpError(error.to_string())
        }
    }

    /// HTTP status associated with this error, if it came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::AuthenticationError { code, .. } | Self::ApiError { code, .. } => Some(*code),
            Self::RateLimitError(_) => Some(429),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::BlockNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_error_body_message_is_extracted() {
        let body = r#"{"error":{"message":"The model `x` does not exist","type":"invalid_request_error","code":"model_not_found"}}"#;
        let err = BlockError::from_response(404, body);
        match err {
            BlockError::ApiError {
                code,
                message,
                details,
            } => {
                assert_eq!(code, 404);
                assert_eq!(message, "The model `x` does not exist");
                assert!(details.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn plain_text_body_is_kept() {
        let err = BlockError::from_response(502, "bad gateway");
        assert_eq!(err.status_code(), Some(502));
        assert_eq!(err.to_string(), "API error 502: bad gateway");
    }

    #[test]
    fn auth_and_rate_limit_statuses_are_classified() {
        assert!(matches!(
            BlockError::from_response(401, "{}"),
            BlockError::AuthenticationError { code: 401, .. }
        ));
        let limited = BlockError::from_response(429, r#"{"error":{"message":"slow down"}}"#);
        assert_eq!(limited.to_string(), "Rate limit exceeded: slow down");
        assert_eq!(limited.status_code(), Some(429));
    }

    #[test]
    fn not_found_display_names_block() {
        let err = BlockError::BlockNotFound {
            block_type: "openai-completion-model".into(),
            name: "curie".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Unable to find block document named curie for block type openai-completion-model"
        );
    }
}
