//! Draft, critique, revise.
//!
//! The loop raises letter quality for tiers that pay for it and hands
//! everyone else the first draft. Sub-calls are retried at the inference
//! layer, never here; an error from the generator or the critic aborts
//! the whole run.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tailorbird_core::{TailorbirdError, UserTier};

use crate::prompts;

pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Quality verdicts in ascending order. The derived ordering is what
/// stops the loop: anything at or above `Strong` is good enough.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq, PartialOrd, Ord)]
pub enum CritiqueDecision {
    #[serde(alias = "reject")]
    Reject,
    #[serde(alias = "weak")]
    Weak,
    #[serde(alias = "average")]
    Average,
    #[serde(alias = "strong")]
    Strong,
    #[serde(alias = "exceptional")]
    Exceptional,
}

/// One critique pass over a draft.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Critique {
    pub decision: CritiqueDecision,
    /// Concrete changes that would raise the rating.
    #[serde(default)]
    pub feedback: Vec<String>,
    /// Claims in the draft that the resume does not support.
    #[serde(default)]
    pub hallucinations: Vec<String>,
}

/// Inputs for one cover-letter run.
#[derive(Clone, Debug)]
pub struct LetterRequest {
    pub job_description: String,
    pub resume: String,
    pub instructions: Option<String>,
    pub tier: UserTier,
}

impl LetterRequest {
    pub fn new(
        job_description: impl Into<String>,
        resume: impl Into<String>,
        tier: UserTier,
    ) -> Self {
        Self {
            job_description: job_description.into(),
            resume: resume.into(),
            instructions: None,
            tier,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RefinedDraft {
    pub text: String,
    pub decision: CritiqueDecision,
    pub attempts: u32,
}

#[async_trait]
pub trait DraftGenerator: Send + Sync {
    /// Produces a draft. `directive` carries revision notes from the
    /// previous critique when this is a regeneration.
    async fn draft(
        &self,
        request: &LetterRequest,
        directive: Option<&str>,
    ) -> Result<String, TailorbirdError>;
}

#[async_trait]
pub trait DraftCritic: Send + Sync {
    async fn critique(
        &self,
        request: &LetterRequest,
        draft: &str,
    ) -> Result<Critique, TailorbirdError>;
}

/// The draft/critique/revise cycle over injected generator and critic
/// seams.
pub struct RefinementLoop {
    generator: Arc<dyn DraftGenerator>,
    critic: Arc<dyn DraftCritic>,
    max_retries: u32,
}

impl RefinementLoop {
    pub fn new(generator: Arc<dyn DraftGenerator>, critic: Arc<dyn DraftCritic>) -> Self {
        Self {
            generator,
            critic,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Generates a draft and, for refinement-enabled tiers, critiques
    /// and regenerates it until the verdict reaches `Strong` or the
    /// retry budget runs out. Lower tiers get the first draft tagged
    /// `Average` with no critique call at all.
    pub async fn generate(&self, request: &LetterRequest) -> Result<RefinedDraft, TailorbirdError> {
        let mut text = self.generator.draft(request, None).await?;
        let mut attempts = 1;

        if !request.tier.refinement_enabled() {
            return Ok(RefinedDraft {
                text,
                decision: CritiqueDecision::Average,
                attempts,
            });
        }

        loop {
            let critique = self.critic.critique(request, &text).await?;
            tracing::debug!(decision = ?critique.decision, attempts, "critique verdict");
            if critique.decision >= CritiqueDecision::Strong || attempts > self.max_retries {
                return Ok(RefinedDraft {
                    text,
                    decision: critique.decision,
                    attempts,
                });
            }
            let directive = prompts::improvement_directive(&critique);
            text = self.generator.draft(request, Some(&directive)).await?;
            attempts += 1;
        }
    }
}
