//! Quota-aware retry around inference calls.
//!
//! Every call is classified on failure: daily-quota exhaustion aborts
//! immediately, transient rate limits back off exponentially until the
//! attempt budget runs out, anything else is fatal on the spot. Exactly
//! one telemetry record is written per call, for the terminal outcome;
//! intermediate retryable failures stay silent.
//!
//! A backoff sequence cannot be cancelled once started; callers that
//! need a ceiling should bound the whole call from outside.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde_json::Value;
use tokio::time::sleep;
use uuid::Uuid;

use crate::{
    AttemptCx, AttemptRecord, AttemptStatus, TailorbirdError, TelemetrySink, USAGE_METADATA_KEY,
};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(2);

/// One policy per deployment, carried by the executor; requests do not
/// override it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            multiplier: 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    DailyQuota,
    RateLimited,
    Other,
}

const DAILY_QUOTA_MARKERS: &[&str] = &["per day", "perday", "daily quota"];

const RATE_LIMIT_MARKERS: &[&str] = &[
    "429",
    "resource_exhausted",
    "rate limit",
    "too many requests",
    "quota",
    "overloaded",
    "high traffic",
];

/// Central classification of provider failures. The provider reports
/// everything through free-text messages, so substring matching is the
/// only contract available; keeping the rules in one place keeps them
/// testable. Daily-quota markers are checked first because those
/// messages also mention "quota".
pub fn classify_message(message: &str) -> ErrorKind {
    let lowered = message.to_lowercase();
    if DAILY_QUOTA_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        return ErrorKind::DailyQuota;
    }
    if RATE_LIMIT_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        return ErrorKind::RateLimited;
    }
    ErrorKind::Other
}

/// Call-scoped identity for telemetry: what ran, against which model,
/// with which (unredacted) prompt.
#[derive(Clone, Debug)]
pub struct CallContext {
    pub event_type: String,
    pub model: String,
    pub prompt: String,
    pub user_id: Option<String>,
}

impl CallContext {
    pub fn new(
        event_type: impl Into<String>,
        model: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            model: model.into(),
            prompt: prompt.into(),
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryNotice {
    pub attempt: u32,
    pub delay: Duration,
    pub message: String,
}

pub type ProgressHook = Arc<dyn Fn(RetryNotice) + Send + Sync>;

pub struct RetryExecutor {
    telemetry: Arc<dyn TelemetrySink>,
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            telemetry,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Runs `op` under the retry policy. Attempts are strictly
    /// sequential; attempt N+1 never starts before attempt N's backoff
    /// has elapsed. The progress hook fires once per scheduled retry
    /// with a human-readable message.
    pub async fn execute<T, F, Fut>(
        &self,
        call: CallContext,
        progress: Option<ProgressHook>,
        mut op: F,
    ) -> Result<T, TailorbirdError>
    where
        F: FnMut(AttemptCx) -> Fut,
        Fut: Future<Output = Result<T, TailorbirdError>>,
    {
        let mut delay = self.policy.initial_delay;

        for attempt in 1..=self.policy.max_attempts {
            let cx = AttemptCx::new(attempt);
            let started = Instant::now();
            match op(cx.clone()).await {
                Ok(value) => {
                    self.record_outcome(&call, &cx, started, AttemptStatus::Success, None)
                        .await;
                    return Ok(value);
                }
                Err(error) => {
                    let message = error.to_string();
                    match classify_message(&message) {
                        ErrorKind::DailyQuota => {
                            tracing::warn!(event = %call.event_type, "daily quota exhausted");
                            self.record_outcome(
                                &call,
                                &cx,
                                started,
                                AttemptStatus::Error,
                                Some(&message),
                            )
                            .await;
                            return Err(TailorbirdError::DailyQuotaExceeded(message));
                        }
                        ErrorKind::RateLimited => {
                            if attempt < self.policy.max_attempts {
                                tracing::debug!(
                                    event = %call.event_type,
                                    attempt,
                                    delay_ms = delay.as_millis() as u64,
                                    "rate limited, backing off"
                                );
                                if let Some(hook) = progress.as_ref() {
                                    hook(RetryNotice {
                                        attempt,
                                        delay,
                                        message: format!(
                                            "The AI service is busy. Retrying (attempt {} of {})…",
                                            attempt + 1,
                                            self.policy.max_attempts
                                        ),
                                    });
                                }
                                sleep(delay).await;
                                delay = delay.saturating_mul(self.policy.multiplier);
                            } else {
                                self.record_outcome(
                                    &call,
                                    &cx,
                                    started,
                                    AttemptStatus::Error,
                                    Some(&message),
                                )
                                .await;
                                return Err(TailorbirdError::RateLimited {
                                    attempts: self.policy.max_attempts,
                                    message,
                                });
                            }
                        }
                        ErrorKind::Other => {
                            self.record_outcome(
                                &call,
                                &cx,
                                started,
                                AttemptStatus::Error,
                                Some(&message),
                            )
                            .await;
                            return Err(error);
                        }
                    }
                }
            }
        }

        // Unreachable while the loop covers every branch; kept so a
        // future edit cannot fall out of the loop silently.
        Err(TailorbirdError::Provider(
            "AI generation failed after multiple attempts.".to_string(),
        ))
    }

    async fn record_outcome(
        &self,
        call: &CallContext,
        cx: &AttemptCx,
        started: Instant,
        status: AttemptStatus,
        error: Option<&str>,
    ) {
        let capture = cx.capture();
        let mut metadata = capture.extra;
        if let Some(usage) = capture.usage {
            metadata.insert(
                USAGE_METADATA_KEY.to_string(),
                serde_json::to_value(usage).unwrap_or(Value::Null),
            );
        }
        let record = AttemptRecord {
            id: Uuid::new_v4(),
            user_id: call.user_id.clone(),
            event_type: call.event_type.clone(),
            model: call.model.clone(),
            prompt: call.prompt.clone(),
            response: capture.response,
            latency_ms: started.elapsed().as_millis() as u64,
            status,
            error: error.map(str::to_string),
            attempt: cx.attempt(),
            metadata,
            recorded_at: Utc::now(),
        };
        self.telemetry.record(record).await;
    }
}
