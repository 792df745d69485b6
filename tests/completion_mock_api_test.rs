//! Mock API tests for the completion block
//!
//! Request and response shapes follow the OpenAI completions reference:
//! https://platform.openai.com/docs/api-reference/completions/create

mod support;

use openai_blocks::prelude::*;
use serde_json::json;
use std::time::Duration;
use support::{completion_model, completion_response, error_response};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_defaults_are_sent_with_prompt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/completions"))
        .and(header("Authorization", "Bearer test-api-key"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "model": "text-curie-001",
            "temperature": 0.5,
            "max_tokens": 16,
            "echo": false,
            "prompt": "Once upon a time"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_response(" there was")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let model = completion_model(&mock_server.uri());
    let completion = model.submit_prompt("Once upon a time").await.unwrap();

    assert_eq!(completion.text(), Some(" there was"));
    assert_eq!(completion.usage.total_tokens, 12);
    assert_eq!(completion.choices[0].finish_reason.as_deref(), Some("length"));
}

#[tokio::test]
async fn test_overrides_replace_block_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/completions"))
        .and(body_json(json!({
            "model": "text-curie-001",
            "temperature": 0.5,
            "max_tokens": 50,
            "echo": false,
            "prompt": "Write a haiku"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_response("...")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut overrides = Params::new();
    overrides.insert("max_tokens".into(), json!(50));
    completion_model(&mock_server.uri())
        .submit_prompt_with("Write a haiku", overrides)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_organization_header_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/completions"))
        .and(header("OpenAI-Organization", "org-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_response("ok")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let credentials = OpenAiCredentials::new("test-api-key")
        .with_base_url(mock_server.uri())
        .with_organization("org-test");
    CompletionModel::new(credentials)
        .submit_prompt("ping")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_authentication_error_propagates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_response(
            "invalid_request_error",
            "Incorrect API key provided: sk-wrong.",
            "invalid_api_key",
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = completion_model(&mock_server.uri())
        .submit_prompt("hi")
        .await
        .unwrap_err();

    match err {
        BlockError::AuthenticationError { code, message } => {
            assert_eq!(code, 401);
            assert!(message.contains("Incorrect API key"));
        }
        other => panic!("Expected AuthenticationError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(error_response(
            "server_error",
            "The server had an error while processing your request.",
            "server_error",
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = completion_model(&mock_server.uri())
        .submit_prompt("hi")
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(500));
}

#[tokio::test]
async fn test_block_timeout_applies_to_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_response("late"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let err = completion_model(&mock_server.uri())
        .with_timeout(0.2)
        .submit_prompt("hi")
        .await
        .unwrap_err();
    assert!(matches!(err, BlockError::TimeoutError(_)), "got {err:?}");
}

#[tokio::test]
async fn test_invalid_block_fails_before_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_response("x")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = completion_model(&mock_server.uri())
        .with_temperature(3.0)
        .submit_prompt("hi")
        .await
        .unwrap_err();
    assert!(matches!(err, BlockError::InvalidParameter(_)));
}

#[test]
fn test_blocking_submission_outside_runtime() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mock_server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_response("sync")))
            .expect(1)
            .mount(&server)
            .await;
        server
    });

    let completion = completion_model(&mock_server.uri())
        .submit_prompt_blocking("hi")
        .unwrap();
    assert_eq!(completion.text(), Some("sync"));
}
