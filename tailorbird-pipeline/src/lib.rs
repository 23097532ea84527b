//! Feature pipelines for Tailorbird: two-pass job distillation and the
//! self-critique cover-letter loop, composed over the core retry and
//! telemetry contracts.

mod distill;
mod letter;
pub mod prompts;
mod refine;
mod runtime;

pub use distill::{merge_phases, DistilledJob, JobDistiller, JobSketch};
pub use letter::{LetterStudio, LlmDraftCritic, LlmDraftGenerator};
pub use refine::{
    Critique, CritiqueDecision, DraftCritic, DraftGenerator, LetterRequest, RefinedDraft,
    RefinementLoop, DEFAULT_MAX_RETRIES,
};
pub use runtime::InferenceRuntime;
