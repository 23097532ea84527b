//! Cover-letter composition over the refinement loop.

use std::sync::Arc;

use async_trait::async_trait;
use tailorbird_core::{InferenceRequest, TailorbirdError, TaskClass};

use crate::prompts;
use crate::refine::{
    Critique, DraftCritic, DraftGenerator, LetterRequest, RefinedDraft, RefinementLoop,
};
use crate::runtime::InferenceRuntime;

const DRAFT_EVENT: &str = "cover_letter_draft";
const CRITIQUE_EVENT: &str = "cover_letter_critique";

/// Model-backed generator. Letters run on the tier's analysis model.
pub struct LlmDraftGenerator {
    runtime: Arc<InferenceRuntime>,
}

impl LlmDraftGenerator {
    pub fn new(runtime: Arc<InferenceRuntime>) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl DraftGenerator for LlmDraftGenerator {
    async fn draft(
        &self,
        request: &LetterRequest,
        directive: Option<&str>,
    ) -> Result<String, TailorbirdError> {
        let model = self.runtime.resolve_model(request.tier, TaskClass::Analysis);
        let call = InferenceRequest::new(model)
            .with_text(prompts::draft_prompt(request, directive))
            .with_generation(prompts::draft_config());
        let text = self.runtime.generate_text(DRAFT_EVENT, call).await?;
        Ok(text.trim().to_string())
    }
}

/// Model-backed critic returning a structured verdict.
pub struct LlmDraftCritic {
    runtime: Arc<InferenceRuntime>,
}

impl LlmDraftCritic {
    pub fn new(runtime: Arc<InferenceRuntime>) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl DraftCritic for LlmDraftCritic {
    async fn critique(
        &self,
        request: &LetterRequest,
        draft: &str,
    ) -> Result<Critique, TailorbirdError> {
        let model = self.runtime.resolve_model(request.tier, TaskClass::Analysis);
        let call = InferenceRequest::new(model)
            .with_text(prompts::critique_prompt(request, draft))
            .with_generation(prompts::critique_config());
        self.runtime.generate_json(CRITIQUE_EVENT, call).await
    }
}

/// The cover-letter feature surface: wires the model-backed generator
/// and critic into the refinement loop.
pub struct LetterStudio {
    refinement: RefinementLoop,
}

impl LetterStudio {
    pub fn new(runtime: Arc<InferenceRuntime>) -> Self {
        let generator = Arc::new(LlmDraftGenerator::new(Arc::clone(&runtime)));
        let critic = Arc::new(LlmDraftCritic::new(runtime));
        Self {
            refinement: RefinementLoop::new(generator, critic),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.refinement = self.refinement.with_max_retries(max_retries);
        self
    }

    pub async fn compose(&self, request: &LetterRequest) -> Result<RefinedDraft, TailorbirdError> {
        self.refinement.generate(request).await
    }
}
