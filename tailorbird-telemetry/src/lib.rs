//! Best-effort telemetry for inference attempts: one ingest record per
//! terminal outcome plus a usage-counter increment, with email and
//! phone redaction applied before anything leaves the process.

mod client;
mod config;
mod redact;
mod sink;

pub use client::{TelemetryClient, TelemetryError};
pub use config::TelemetryConfig;
pub use redact::redact_pii;
pub use sink::HttpTelemetrySink;
