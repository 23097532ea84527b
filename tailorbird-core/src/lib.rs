//! Core contracts for the Tailorbird orchestration layer: the inference
//! client abstraction, model catalog, quota-aware retry executor, output
//! sanitizer and the telemetry types shared by every transport.

mod catalog;
mod client;
mod error;
mod inference;
mod retry;
mod sanitize;
mod telemetry;

pub use catalog::{ModelCatalog, ModelRow, TaskClass, UserTier};
pub use client::InferenceClient;
pub use error::{user_facing_message, TailorbirdError};
pub use inference::{
    ContentPart, GenerationConfig, InferenceRequest, InferenceResult, ResponseFormat, TokenUsage,
};
pub use retry::{
    classify_message, CallContext, ErrorKind, ProgressHook, RetryExecutor, RetryNotice,
    RetryPolicy, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS,
};
pub use sanitize::{clean_model_output, parse_model_json};
pub use telemetry::{
    AttemptCapture, AttemptCx, AttemptRecord, AttemptStatus, NoopTelemetry, TelemetrySink,
    USAGE_METADATA_KEY,
};
