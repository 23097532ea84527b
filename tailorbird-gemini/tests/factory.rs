use std::sync::Arc;

use httpmock::prelude::*;
use secrecy::SecretString;
use serde_json::json;

use tailorbird_core::{InferenceRequest, TailorbirdError};
use tailorbird_gemini::{ClientFactory, MemoryCredentialStore};

#[tokio::test]
async fn resolves_direct_transport_when_credential_exists() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.0-flash:generateContent")
            .query_param("key", "stored-key");
        then.status(200).json_body(json!({
            "candidates": [
                {"content": {"parts": [{"text": "direct"}]}, "finishReason": "STOP"}
            ]
        }));
    });

    let store = Arc::new(
        MemoryCredentialStore::new().with_current(SecretString::new("stored-key".to_string())),
    );
    let factory = ClientFactory::new(store)
        .with_gemini_base_url(server.url(""))
        .with_relay_url(server.url("/relay"));

    let client = factory.resolve().await.unwrap();
    let result = client
        .generate(InferenceRequest::new("gemini-2.0-flash").with_text("hi"))
        .await
        .unwrap();

    assert_eq!(result.text, "direct");
    mock.assert();
}

#[tokio::test]
async fn resolves_relay_transport_without_credential() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/relay");
        then.status(200).json_body(json!({ "text": "relayed" }));
    });

    let factory = ClientFactory::new(Arc::new(MemoryCredentialStore::new()))
        .with_gemini_base_url(server.url(""))
        .with_relay_url(server.url("/relay"));

    let client = factory.resolve().await.unwrap();
    let result = client
        .generate(InferenceRequest::new("gemini-2.0-flash").with_text("hi"))
        .await
        .unwrap();

    assert_eq!(result.text, "relayed");
    mock.assert();
}

#[tokio::test]
async fn resolve_without_any_transport_is_invalid_config() {
    let factory = ClientFactory::new(Arc::new(MemoryCredentialStore::new()));

    let err = factory.resolve().await.unwrap_err();
    assert!(matches!(err, TailorbirdError::InvalidConfig(_)));
}
