//! Shared helpers for mock API tests.

#![allow(dead_code)]

use serde_json::{Value, json};
use std::sync::Arc;

use openai_blocks::prelude::*;

pub const BLOCK_NAME: &str = "interpreter";

/// Completions response with a single choice.
/// Based on: https://platform.openai.com/docs/api-reference/completions/object
pub fn completion_response(text: &str) -> Value {
    json!({
        "id": "cmpl-uqkvlQyYK7bGYrRHQ0eXlWi7",
        "object": "text_completion",
        "created": 1589478378,
        "model": "text-curie-001",
        "choices": [{
            "text": text,
            "index": 0,
            "logprobs": null,
            "finish_reason": "length"
        }],
        "usage": {
            "prompt_tokens": 5,
            "completion_tokens": 7,
            "total_tokens": 12
        }
    })
}

/// Official OpenAI error response format
pub fn error_response(error_type: &str, message: &str, code: &str) -> Value {
    json!({
        "error": {
            "message": message,
            "type": error_type,
            "param": null,
            "code": code
        }
    })
}

pub fn completion_model(base_url: &str) -> CompletionModel {
    CompletionModel::new(OpenAiCredentials::new("test-api-key").with_base_url(base_url))
}

/// In-memory store holding a completion model named [`BLOCK_NAME`].
pub async fn store_with_model(base_url: &str) -> Arc<MemoryBlockStore> {
    let store = Arc::new(MemoryBlockStore::new());
    store
        .save_block(BLOCK_NAME, &completion_model(base_url), false)
        .await
        .expect("save block");
    store
}

pub async fn interpreter_for(base_url: &str) -> ErrorInterpreter {
    ErrorInterpreter::new(store_with_model(base_url).await, BLOCK_NAME)
}
