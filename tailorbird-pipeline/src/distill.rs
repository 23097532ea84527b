//! Two-pass job distillation: a cheap extraction pass over the posting,
//! a scored analysis pass against the resume, and the merge that
//! reconciles them into one record.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tailorbird_core::{InferenceRequest, TailorbirdError, TaskClass, UserTier};

use crate::prompts;
use crate::runtime::InferenceRuntime;

const EXTRACTION_EVENT: &str = "job_extraction";
const ANALYSIS_EVENT: &str = "job_analysis";

/// Partial view of a posting as a single model pass reports it. Every
/// field is optional; the merge decides which pass a field comes from.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobSketch {
    pub company_name: Option<String>,
    pub role_title: Option<String>,
    pub job_category: Option<String>,
    pub canonical_title: Option<String>,
    pub key_skills: Option<Vec<String>>,
    pub core_responsibilities: Option<Vec<String>>,
    pub compatibility_score: Option<f32>,
    pub match_summary: Option<String>,
    pub is_ai_banned: Option<bool>,
    pub ai_ban_reason: Option<String>,
}

/// The normalized job record the rest of the application consumes.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DistilledJob {
    pub company_name: Option<String>,
    pub role_title: Option<String>,
    pub job_category: Option<String>,
    pub canonical_title: Option<String>,
    pub key_skills: Vec<String>,
    pub core_responsibilities: Vec<String>,
    pub compatibility_score: Option<f32>,
    pub match_summary: Option<String>,
    pub is_ai_banned: bool,
    pub ai_ban_reason: Option<String>,
}

/// Reconciles the two passes into one record.
///
/// Safety fields take the extraction pass whenever it set them; the
/// analysis value is only a fallback. List fields take the analysis pass
/// unless it came back empty, in which case extraction fills in.
/// Everything else is analysis over extraction. A merge with neither a
/// compatibility score nor any key skills is rejected.
pub fn merge_phases(
    extraction: JobSketch,
    analysis: JobSketch,
) -> Result<DistilledJob, TailorbirdError> {
    let merged = DistilledJob {
        company_name: analysis.company_name.or(extraction.company_name),
        role_title: analysis.role_title.or(extraction.role_title),
        job_category: analysis.job_category.or(extraction.job_category),
        canonical_title: analysis.canonical_title.or(extraction.canonical_title),
        key_skills: pick_list(analysis.key_skills, extraction.key_skills),
        core_responsibilities: pick_list(
            analysis.core_responsibilities,
            extraction.core_responsibilities,
        ),
        compatibility_score: analysis
            .compatibility_score
            .or(extraction.compatibility_score),
        match_summary: analysis.match_summary.or(extraction.match_summary),
        is_ai_banned: extraction
            .is_ai_banned
            .or(analysis.is_ai_banned)
            .unwrap_or(false),
        ai_ban_reason: extraction.ai_ban_reason.or(analysis.ai_ban_reason),
    };

    if merged.compatibility_score.is_none() && merged.key_skills.is_empty() {
        tracing::warn!("merged job analysis carried no score and no skills");
        return Err(TailorbirdError::EmptyInsight);
    }
    Ok(merged)
}

fn pick_list(preferred: Option<Vec<String>>, fallback: Option<Vec<String>>) -> Vec<String> {
    preferred
        .filter(|items| !items.is_empty())
        .or(fallback)
        .unwrap_or_default()
}

/// Runs the extraction pass, then the analysis pass, then the merge.
/// Each pass goes through the retry executor and the output sanitizer.
pub struct JobDistiller {
    runtime: Arc<InferenceRuntime>,
}

impl JobDistiller {
    pub fn new(runtime: Arc<InferenceRuntime>) -> Self {
        Self { runtime }
    }

    pub async fn distill(
        &self,
        job_text: &str,
        resume_text: &str,
        tier: UserTier,
    ) -> Result<DistilledJob, TailorbirdError> {
        let model = self.runtime.resolve_model(tier, TaskClass::Extraction);
        let request = InferenceRequest::new(model)
            .with_text(prompts::extraction_prompt(job_text))
            .with_generation(prompts::extraction_config());
        let extraction: JobSketch = self.runtime.generate_json(EXTRACTION_EVENT, request).await?;

        let model = self.runtime.resolve_model(tier, TaskClass::Analysis);
        let request = InferenceRequest::new(model)
            .with_text(prompts::analysis_prompt(job_text, resume_text))
            .with_generation(prompts::analysis_config());
        let analysis: JobSketch = self.runtime.generate_json(ANALYSIS_EVENT, request).await?;

        merge_phases(extraction, analysis)
    }
}
