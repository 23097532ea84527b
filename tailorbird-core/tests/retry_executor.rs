use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use tokio::time::Instant;

use tailorbird_core::{
    AttemptRecord, AttemptStatus, CallContext, ProgressHook, RetryExecutor, RetryNotice,
    RetryPolicy, TailorbirdError, TelemetrySink, TokenUsage,
};

#[derive(Default)]
struct RecordingSink {
    records: Mutex<Vec<AttemptRecord>>,
}

impl RecordingSink {
    fn records(&self) -> Vec<AttemptRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TelemetrySink for RecordingSink {
    async fn record(&self, record: AttemptRecord) {
        self.records.lock().unwrap().push(record);
    }
}

fn call() -> CallContext {
    CallContext::new("tailor_resume", "gemini-2.5-flash", "Tailor this resume.")
        .with_user("user-42")
}

#[tokio::test(start_paused = true)]
async fn succeeds_after_transient_rate_limits() {
    let sink = Arc::new(RecordingSink::default());
    let executor = RetryExecutor::new(Arc::clone(&sink) as Arc<dyn TelemetrySink>);
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);

    let output = executor
        .execute(call(), None, move |_cx| {
            let counter = Arc::clone(&counter);
            async move {
                let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    return Err(TailorbirdError::Provider(
                        "HTTP 429: too many requests".to_string(),
                    ));
                }
                Ok("tailored".to_string())
            }
        })
        .await
        .unwrap();

    assert_eq!(output, "tailored");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, AttemptStatus::Success);
    assert_eq!(records[0].attempt, 3);
    assert_eq!(records[0].event_type, "tailor_resume");
    assert_eq!(records[0].model, "gemini-2.5-flash");
    assert_eq!(records[0].user_id.as_deref(), Some("user-42"));
    assert!(records[0].error.is_none());
}

#[tokio::test(start_paused = true)]
async fn backoff_delays_double_between_attempts() {
    let executor = RetryExecutor::new(Arc::new(RecordingSink::default()));
    let starts: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&starts);
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);

    executor
        .execute(call(), None, move |_cx| {
            let recorder = Arc::clone(&recorder);
            let counter = Arc::clone(&counter);
            async move {
                recorder.lock().unwrap().push(Instant::now());
                let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    return Err(TailorbirdError::Provider(
                        "model is overloaded, try again".to_string(),
                    ));
                }
                Ok(())
            }
        })
        .await
        .unwrap();

    let starts = starts.lock().unwrap();
    assert_eq!(starts.len(), 3);
    assert_eq!(starts[1] - starts[0], Duration::from_secs(2));
    assert_eq!(starts[2] - starts[1], Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn rate_limit_budget_exhausts_after_max_attempts() {
    let sink = Arc::new(RecordingSink::default());
    let executor = RetryExecutor::new(Arc::clone(&sink) as Arc<dyn TelemetrySink>);
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);

    let err = executor
        .execute(call(), None, move |_cx| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TailorbirdError::Provider(
                    "RESOURCE_EXHAUSTED: rate limit hit".to_string(),
                ))
            }
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TailorbirdError::RateLimited { attempts: 3, .. }
    ));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, AttemptStatus::Error);
    assert_eq!(records[0].attempt, 3);
    assert!(records[0].error.as_deref().unwrap().contains("rate limit"));
}

#[tokio::test(start_paused = true)]
async fn daily_quota_aborts_without_backoff() {
    let sink = Arc::new(RecordingSink::default());
    let executor = RetryExecutor::new(Arc::clone(&sink) as Arc<dyn TelemetrySink>);
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let before = Instant::now();

    let err = executor
        .execute(call(), None, move |_cx| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TailorbirdError::Provider(
                    "Quota exceeded: 50 requests per day for this model".to_string(),
                ))
            }
        })
        .await
        .unwrap_err();

    assert!(matches!(err, TailorbirdError::DailyQuotaExceeded(_)));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    // No sleep was scheduled on the paused clock.
    assert_eq!(Instant::now() - before, Duration::ZERO);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, AttemptStatus::Error);
    assert_eq!(records[0].attempt, 1);
}

#[tokio::test]
async fn unrecognized_errors_fail_fast() {
    let sink = Arc::new(RecordingSink::default());
    let executor = RetryExecutor::new(Arc::clone(&sink) as Arc<dyn TelemetrySink>);
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);

    let err = executor
        .execute(call(), None, move |_cx| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TailorbirdError::Provider("API key not valid".to_string()))
            }
        })
        .await
        .unwrap_err();

    assert!(matches!(err, TailorbirdError::Provider(_)));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(sink.records().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn progress_hook_announces_each_retry() {
    let executor = RetryExecutor::new(Arc::new(RecordingSink::default()));
    let notices: Arc<Mutex<Vec<RetryNotice>>> = Arc::new(Mutex::new(Vec::new()));
    let collector = Arc::clone(&notices);
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let hook: ProgressHook = Arc::new(move |notice| {
        collector.lock().unwrap().push(notice);
    });

    executor
        .execute(call(), Some(hook), move |_cx| {
            let counter = Arc::clone(&counter);
            async move {
                let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    return Err(TailorbirdError::Provider("429".to_string()));
                }
                Ok(())
            }
        })
        .await
        .unwrap();

    let notices = notices.lock().unwrap();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[0].attempt, 1);
    assert_eq!(notices[0].delay, Duration::from_secs(2));
    assert_eq!(notices[1].attempt, 2);
    assert_eq!(notices[1].delay, Duration::from_secs(4));
    assert!(notices[0].message.contains("Retrying"));
}

#[tokio::test]
async fn terminal_record_carries_usage_and_response() {
    let sink = Arc::new(RecordingSink::default());
    let executor = RetryExecutor::new(Arc::clone(&sink) as Arc<dyn TelemetrySink>);

    executor
        .execute(call(), None, |cx| async move {
            cx.record_usage(TokenUsage {
                prompt_tokens: 12,
                completion_tokens: 18,
                total_tokens: 30,
            });
            cx.record_response("Dear hiring manager");
            Ok(())
        })
        .await
        .unwrap();

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].response.as_deref(), Some("Dear hiring manager"));
    let usage = records[0].token_usage().unwrap();
    assert_eq!(usage.total_tokens, 30);
}

#[tokio::test]
async fn zero_attempt_policy_reports_provider_failure() {
    let executor = RetryExecutor::new(Arc::new(RecordingSink::default())).with_policy(
        RetryPolicy {
            max_attempts: 0,
            initial_delay: Duration::from_millis(1),
            multiplier: 2,
        },
    );
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);

    let err = executor
        .execute(call(), None, move |_cx| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), TailorbirdError>(())
            }
        })
        .await
        .unwrap_err();

    assert!(matches!(err, TailorbirdError::Provider(_)));
    assert_eq!(attempts.load(Ordering::SeqCst), 0);
}
