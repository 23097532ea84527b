use std::time::Duration;

use secrecy::SecretString;

#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    pub api_key: SecretString,
    pub ingest_url: String,
    /// Session user, attached to records that do not carry one already.
    pub user_id: Option<String>,
    pub request_timeout: Duration,
}

impl TelemetryConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            ingest_url: "https://telemetry.tailorbird.app".to_string(),
            user_id: None,
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_ingest_url(mut self, ingest_url: impl Into<String>) -> Self {
        self.ingest_url = ingest_url.into();
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
