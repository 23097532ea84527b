use std::time::Duration;

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::time::sleep;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("http error: {status}")]
    Http { status: StatusCode, body: String },
}

#[derive(Clone)]
pub struct TelemetryClient {
    client: Client,
    ingest_url: String,
    api_key: SecretString,
}

impl TelemetryClient {
    pub fn new(ingest_url: String, api_key: SecretString, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("valid reqwest client config");
        Self {
            client,
            ingest_url,
            api_key,
        }
    }

    pub async fn post_event(&self, payload: &Value) -> Result<(), TelemetryError> {
        let url = format!("{}/v1/events", self.ingest_url.trim_end_matches('/'));
        self.send_with_retry(&url, payload).await
    }

    pub async fn post_usage(&self, user_id: &str, total_tokens: u32) -> Result<(), TelemetryError> {
        let url = format!("{}/v1/usage", self.ingest_url.trim_end_matches('/'));
        let payload = json!({ "userId": user_id, "totalTokens": total_tokens });
        self.send_with_retry(&url, &payload).await
    }

    async fn send_with_retry(&self, url: &str, payload: &Value) -> Result<(), TelemetryError> {
        let mut attempt = 0;
        let mut backoff = Duration::from_millis(200);

        loop {
            attempt += 1;
            let request = self
                .client
                .post(url)
                .header("x-api-key", self.api_key.expose_secret())
                .json(payload);

            match request.send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        return Ok(());
                    }
                    if should_retry(response.status()) && attempt < 3 {
                        sleep(backoff).await;
                        backoff = backoff.saturating_mul(2);
                        continue;
                    }
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(TelemetryError::Http { status, body });
                }
                Err(err) => {
                    if (err.is_timeout() || err.is_connect()) && attempt < 3 {
                        sleep(backoff).await;
                        backoff = backoff.saturating_mul(2);
                        continue;
                    }
                    return Err(TelemetryError::Request(err));
                }
            }
        }
    }
}

fn should_retry(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}
