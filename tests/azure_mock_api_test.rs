//! Mock API tests for Azure OpenAI credentials
//!
//! Azure routes by deployment and authenticates with the `api-key` header or an
//! Azure AD bearer token:
//! https://learn.microsoft.com/azure/ai-services/openai/reference

mod support;

use openai_blocks::prelude::*;
use openai_blocks::types::ImageResponseFormat;
use serde_json::json;
use std::sync::Arc;
use support::completion_response;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn api_key_absent(request: &Request) -> bool {
    !request.headers.contains_key("api-key")
}

#[tokio::test]
async fn test_completion_uses_deployment_route_and_api_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/my-curie/completions"))
        .and(query_param("api-version", "2023-12-01-preview"))
        .and(header("api-key", "azure-key"))
        .and(body_partial_json(json!({"model": "my-curie", "prompt": "hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_response(" world")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let credentials = AzureOpenAiCredentials::new("azure-key", mock_server.uri());
    let model = CompletionModel::new(credentials).with_model("my-curie");
    let completion = model.submit_prompt("hello").await.unwrap();
    assert_eq!(completion.text(), Some(" world"));
}

#[tokio::test]
async fn test_azure_ad_token_replaces_api_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/my-curie/completions"))
        .and(query_param("api-version", "2024-02-01"))
        .and(header("Authorization", "Bearer aad-token"))
        .and(api_key_absent)
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_response("ok")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let credentials = AzureOpenAiCredentials::new("", mock_server.uri())
        .with_api_version("2024-02-01")
        .with_azure_ad_token_provider(Arc::new(StaticTokenProvider::new("aad-token")));
    CompletionModel::new(credentials)
        .with_model("my-curie")
        .submit_prompt("hi")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_registered_token_provider_survives_store_round_trip() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/my-curie/completions"))
        .and(header("Authorization", "Bearer stored-aad-token"))
        .and(api_key_absent)
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_response("ok")))
        .expect(1)
        .mount(&mock_server)
        .await;

    register_token_provider(
        "azure-store-round-trip",
        Arc::new(StaticTokenProvider::new("stored-aad-token")),
    )
    .unwrap();
    let credentials = AzureOpenAiCredentials::new("", mock_server.uri())
        .with_registered_token_provider("azure-store-round-trip");
    let model = CompletionModel::new(credentials).with_model("my-curie");
    let store = MemoryBlockStore::new();
    store.save_block("aad-curie", &model, false).await.unwrap();

    let loaded: CompletionModel = store.load_block("aad-curie").await.unwrap();
    let completion = loaded.submit_prompt("hi").await.unwrap();
    assert_eq!(completion.text(), Some("ok"));
}

#[tokio::test]
async fn test_in_memory_token_provider_is_not_silently_dropped_on_save() {
    let credentials = AzureOpenAiCredentials::new("", "https://res.openai.azure.com")
        .with_azure_ad_token_provider(Arc::new(StaticTokenProvider::new("aad-token")));
    let store = MemoryBlockStore::new();

    let err = store
        .save_block("aad-curie", &CompletionModel::new(credentials), false)
        .await
        .unwrap_err();
    assert!(matches!(err, BlockError::ConfigurationError(_)));
    assert!(store.list_names("openai-completion-model").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_image_generation_routes_to_image_deployment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/dalle/images/generations"))
        .and(header("api-key", "azure-key"))
        .and(body_partial_json(json!({
            "prompt": "a lighthouse",
            "response_format": "b64_json"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "created": 1700000000,
            "data": [{"b64_json": "iVBORw0KGgo="}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let model = ImageModel::new(AzureOpenAiCredentials::new("azure-key", mock_server.uri()))
        .with_model("dalle")
        .with_response_format(ImageResponseFormat::B64Json);
    let response = model.submit_prompt("a lighthouse").await.unwrap();
    assert_eq!(response.data[0].b64_json.as_deref(), Some("iVBORw0KGgo="));
}

#[tokio::test]
async fn test_image_without_deployment_is_rejected_on_azure() {
    let model = ImageModel::new(AzureOpenAiCredentials::new(
        "azure-key",
        "https://unused.openai.azure.com",
    ));
    let err = model.submit_prompt("a lighthouse").await.unwrap_err();
    assert!(matches!(err, BlockError::InvalidParameter(_)));
}
