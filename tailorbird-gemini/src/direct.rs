//! Direct Gemini API transport.

use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use tailorbird_core::{InferenceClient, InferenceRequest, InferenceResult, TailorbirdError};

use crate::wire::{
    into_result, map_contents, map_generation_config, GeminiErrorResponse,
    GenerateContentRequest, GenerateContentResponse,
};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Clone)]
pub struct DirectClient {
    base_url: String,
    api_key: SecretString,
    http: Client,
}

impl DirectClient {
    pub fn new(api_key: SecretString) -> Self {
        let timeout = Duration::from_secs(120);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .expect("valid reqwest client config");
        Self {
            base_url: GEMINI_BASE_URL.to_string(),
            api_key,
            http,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn generate_url(&self, request_model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model_name(request_model)
        )
    }
}

fn model_name(model: &str) -> &str {
    let model = model.trim();
    model.strip_prefix("models/").unwrap_or(model)
}

#[async_trait::async_trait]
impl InferenceClient for DirectClient {
    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResult, TailorbirdError> {
        let body = GenerateContentRequest {
            contents: map_contents(&request),
            generation_config: map_generation_config(request.generation()),
        };

        let response = self
            .http
            .post(self.generate_url(request.model()))
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            .await
            .map_err(|err| TailorbirdError::Provider(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {}: {}", status, body));
            return Err(TailorbirdError::Provider(message));
        }

        let response = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|err| TailorbirdError::Provider(err.to_string()))?;

        into_result(response)
    }
}
