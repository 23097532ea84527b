use std::future::Future;
use std::sync::Mutex;

use tokio::task::JoinHandle;

use tailorbird_core::{AttemptRecord, TelemetrySink};

use crate::{redact_pii, TelemetryClient, TelemetryConfig};

/// HTTP-backed sink. `record` redacts, then spawns detached deliveries;
/// the caller never waits on the network and never sees a telemetry
/// failure. A token-usage increment rides along when the record carries
/// usage metadata and a user.
pub struct HttpTelemetrySink {
    client: TelemetryClient,
    user_id: Option<String>,
    deliveries: Mutex<Vec<JoinHandle<()>>>,
}

impl HttpTelemetrySink {
    pub fn new(config: TelemetryConfig) -> Self {
        let client =
            TelemetryClient::new(config.ingest_url, config.api_key, config.request_timeout);
        Self {
            client,
            user_id: config.user_id,
            deliveries: Mutex::new(Vec::new()),
        }
    }

    /// Awaits every delivery spawned so far. Called on shutdown; a sink
    /// dropped without flushing may lose in-flight records, which is
    /// within the best-effort contract.
    pub async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut deliveries = self.deliveries.lock().expect("delivery lock poisoned");
            deliveries.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Deliveries still tracked. Completed handles are pruned as new
    /// ones spawn, so this stays bounded by in-flight work.
    pub fn pending_deliveries(&self) -> usize {
        self.deliveries.lock().expect("delivery lock poisoned").len()
    }

    fn spawn_delivery<F>(&self, delivery: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(delivery);
        let mut deliveries = self.deliveries.lock().expect("delivery lock poisoned");
        deliveries.retain(|pending| !pending.is_finished());
        deliveries.push(handle);
    }
}

#[async_trait::async_trait]
impl TelemetrySink for HttpTelemetrySink {
    async fn record(&self, mut record: AttemptRecord) {
        record.prompt = redact_pii(&record.prompt);
        if let Some(response) = record.response.take() {
            record.response = Some(redact_pii(&response));
        }
        if record.user_id.is_none() {
            record.user_id = self.user_id.clone();
        }

        let usage = record.token_usage();
        let user_id = record.user_id.clone();

        let payload = match serde_json::to_value(&record) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "telemetry record not serializable, dropped");
                return;
            }
        };

        let client = self.client.clone();
        self.spawn_delivery(async move {
            if let Err(err) = client.post_event(&payload).await {
                tracing::warn!(error = %err, "telemetry event delivery failed");
            }
        });

        if let (Some(usage), Some(user_id)) = (usage, user_id) {
            let client = self.client.clone();
            self.spawn_delivery(async move {
                if let Err(err) = client.post_usage(&user_id, usage.total_tokens).await {
                    tracing::debug!(error = %err, "usage counter increment failed");
                }
            });
        }
    }
}
