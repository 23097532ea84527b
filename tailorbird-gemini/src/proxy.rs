//! Relay transport for deployments without a local Gemini credential.
//! The relay owns the provider key; this client only forwards the
//! payload and interprets the `{text}` / `{error}` envelope.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use tailorbird_core::{InferenceClient, InferenceRequest, InferenceResult, TailorbirdError};

use crate::wire::{map_contents, map_generation_config, Content, GenerationConfigBody};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayRequest {
    payload: RelayPayload,
    model_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfigBody>,
}

#[derive(Debug, Serialize)]
struct RelayPayload {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
    text: Option<String>,
    error: Option<String>,
}

#[derive(Clone)]
pub struct ProxyClient {
    relay_url: String,
    http: Client,
}

impl ProxyClient {
    pub fn new(relay_url: impl Into<String>) -> Self {
        let timeout = Duration::from_secs(120);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .expect("valid reqwest client config");
        Self {
            relay_url: relay_url.into(),
            http,
        }
    }
}

#[async_trait::async_trait]
impl InferenceClient for ProxyClient {
    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResult, TailorbirdError> {
        let body = RelayRequest {
            payload: RelayPayload {
                contents: map_contents(&request),
            },
            model_name: request.model().to_string(),
            generation_config: map_generation_config(request.generation()),
        };

        let response = self
            .http
            .post(&self.relay_url)
            .json(&body)
            .send()
            .await
            .map_err(|err| TailorbirdError::Proxy(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TailorbirdError::Proxy(format!("HTTP {}: {}", status, body)));
        }

        let relayed = response
            .json::<RelayResponse>()
            .await
            .map_err(|err| TailorbirdError::Proxy(err.to_string()))?;

        // A provider failure reported through the relay keeps its original
        // message so quota markers still classify upstream.
        if let Some(error) = relayed.error {
            return Err(TailorbirdError::Provider(error));
        }

        let text = relayed.text.ok_or_else(|| {
            TailorbirdError::Proxy("relay returned neither text nor error".to_string())
        })?;

        Ok(InferenceResult { text, usage: None })
    }
}
