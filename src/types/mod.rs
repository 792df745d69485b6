//! Request, response and transport configuration types

pub mod completion;
pub mod http;
pub mod image;

pub use completion::{Completion, CompletionChoice, CompletionRequest, Usage};
pub use http::{HttpConfig, HttpConfigBuilder};
pub use image::{GeneratedImage, ImageRequest, ImageResponse, ImageResponseFormat, ImageSize};

use serde_json::{Map, Value};
use std::time::Duration;

use crate::error::BlockError;

/// Request parameters as sent to the API; also the shape of per-call overrides.
pub type Params = Map<String, Value>;

/// Remove `timeout` (seconds) from `params`.
pub(crate) fn take_timeout(params: &mut Params) -> Result<Option<Duration>, BlockError> {
    match params.remove("timeout") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            let invalid = || {
                BlockError::InvalidParameter(format!("timeout must be a positive number, got {n}"))
            };
            let secs = n.as_f64().filter(|s| s.is_finite() && *s > 0.0).ok_or_else(invalid)?;
            Duration::try_from_secs_f64(secs)
                .map(Some)
                .map_err(|_| invalid())
        }
        Some(other) => Err(BlockError::InvalidParameter(format!(
            "timeout must be a number of seconds, got {other}"
        ))),
    }
}
