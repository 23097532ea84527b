//! Tailorbird: quota-aware Gemini orchestration for a career assistant.
//!
//! The core contracts (inference client seam, model catalog, retry
//! executor, output sanitizer, telemetry types) are re-exported at the
//! crate root. Transports and feature pipelines hang off feature flags:
//! `gemini` for the direct and proxy clients, `telemetry` for the HTTP
//! ingest sink, `pipeline` for job distillation and the cover-letter
//! refinement loop.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tailorbird::gemini::{ClientFactory, FileCredentialStore};
//! use tailorbird::pipeline::{InferenceRuntime, JobDistiller};
//! use tailorbird::{NoopTelemetry, UserTier};
//!
//! # async fn run() -> Result<(), tailorbird::TailorbirdError> {
//! let store = Arc::new(FileCredentialStore::new("/var/lib/tailorbird"));
//! let client = ClientFactory::new(store)
//!     .with_relay_url("https://relay.tailorbird.app/generate")
//!     .resolve()
//!     .await?;
//!
//! let runtime = Arc::new(InferenceRuntime::new(client, Arc::new(NoopTelemetry)));
//! let job = JobDistiller::new(runtime)
//!     .distill("Senior Backend Engineer at Acme", "5 years Go", UserTier::Pro)
//!     .await?;
//! println!("{:?}", job.key_skills);
//! # Ok(())
//! # }
//! ```

pub use tailorbird_core::*;

#[cfg(feature = "gemini")]
pub use tailorbird_gemini as gemini;

#[cfg(feature = "pipeline")]
pub use tailorbird_pipeline as pipeline;

#[cfg(feature = "telemetry")]
pub use tailorbird_telemetry as telemetry;
