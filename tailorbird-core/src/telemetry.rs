//! Structured records for inference observability, and the injectable
//! sink they flow into. The sink is a collaborator, not a hard-wired
//! call, so retry logic stays testable without a persistence backend.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::TokenUsage;

pub const USAGE_METADATA_KEY: &str = "usage";

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    Success,
    Error,
}

/// One record per terminal inference outcome. Prompt and response are
/// redacted by the sink before they leave the process.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub event_type: String,
    pub model: String,
    pub prompt: String,
    pub response: Option<String>,
    pub latency_ms: u64,
    pub status: AttemptStatus,
    pub error: Option<String>,
    pub attempt: u32,
    pub metadata: BTreeMap<String, Value>,
    pub recorded_at: DateTime<Utc>,
}

impl AttemptRecord {
    /// Token usage attached by the inference callback, if any.
    pub fn token_usage(&self) -> Option<TokenUsage> {
        self.metadata
            .get(USAGE_METADATA_KEY)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

#[async_trait::async_trait]
pub trait TelemetrySink: Send + Sync {
    /// Fire-and-forget. Implementations must swallow their own failures;
    /// telemetry can never fail a feature call.
    async fn record(&self, record: AttemptRecord);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTelemetry;

#[async_trait::async_trait]
impl TelemetrySink for NoopTelemetry {
    async fn record(&self, _record: AttemptRecord) {}
}

/// Per-attempt execution context. The retry executor builds a fresh one
/// for every attempt and hands it to the operation closure, which may
/// attach token usage, a response preview, and extra metadata; the
/// executor drains it into the telemetry record for the terminal
/// outcome.
#[derive(Clone, Debug, Default)]
pub struct AttemptCx {
    attempt: u32,
    shared: Arc<Mutex<AttemptCapture>>,
}

#[derive(Clone, Debug, Default)]
pub struct AttemptCapture {
    pub usage: Option<TokenUsage>,
    pub response: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

impl AttemptCx {
    pub fn new(attempt: u32) -> Self {
        Self {
            attempt,
            shared: Arc::new(Mutex::new(AttemptCapture::default())),
        }
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn record_usage(&self, usage: TokenUsage) {
        self.lock().usage = Some(usage);
    }

    pub fn record_response(&self, response: impl Into<String>) {
        self.lock().response = Some(response.into());
    }

    pub fn annotate(&self, key: impl Into<String>, value: Value) {
        self.lock().extra.insert(key.into(), value);
    }

    pub fn capture(&self) -> AttemptCapture {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AttemptCapture> {
        // Never held across an await; poisoning would mean a panic in a
        // plain setter.
        self.shared.lock().expect("attempt context lock poisoned")
    }
}
