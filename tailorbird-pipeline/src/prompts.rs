//! Prompt builders and per-call generation settings.
//!
//! Every structured call ships a response schema derived from the serde
//! struct it will be parsed into, so the model answers in the shape
//! `parse_model_json` expects.

use serde_json::Value;
use tailorbird_core::GenerationConfig;

use crate::distill::JobSketch;
use crate::refine::{Critique, LetterRequest};

pub fn extraction_prompt(job_text: &str) -> String {
    format!(
        "You extract structured facts from job postings.\n\n\
         Read the posting below and fill in every field you can: company name, role title, \
         job category, a short canonical title for the role, headline skills and core \
         responsibilities. Leave out anything the posting does not state.\n\n\
         Also check whether the posting forbids the use of AI tools when applying. If it \
         does, set isAiBanned to true and quote the relevant sentence in aiBanReason.\n\n\
         Posting:\n{job_text}\n\n\
         Answer with a single JSON object. No commentary."
    )
}

/// Field pulls run cold so repeated scans of the same posting agree.
pub fn extraction_config() -> GenerationConfig {
    GenerationConfig::json()
        .with_temperature(0.1)
        .with_schema(schema_for::<JobSketch>())
}

pub fn analysis_prompt(job_text: &str, resume_text: &str) -> String {
    format!(
        "You are a career advisor scoring how well a candidate fits a role.\n\n\
         Compare the resume against the posting and produce:\n\
         - compatibilityScore: a number between 0 and 1\n\
         - keySkills: the skills from the posting that matter most for this candidate\n\
         - coreResponsibilities: what the candidate would actually do in the role\n\
         - matchSummary: two or three sentences covering strengths and gaps\n\n\
         Posting:\n{job_text}\n\n\
         Resume:\n{resume_text}\n\n\
         Answer with a single JSON object. No commentary."
    )
}

pub fn analysis_config() -> GenerationConfig {
    GenerationConfig::json()
        .with_temperature(0.4)
        .with_schema(schema_for::<JobSketch>())
}

pub fn draft_prompt(request: &LetterRequest, directive: Option<&str>) -> String {
    let mut prompt = format!(
        "Write a cover letter for the role described below, grounded strictly in the \
         candidate's resume. Never claim experience the resume does not support. Three to \
         four paragraphs, confident but plain tone, no placeholder fields.\n\n\
         Role:\n{}\n\n\
         Resume:\n{}\n",
        request.job_description, request.resume
    );
    if let Some(instructions) = &request.instructions {
        prompt.push_str("\nInstructions from the candidate:\n");
        prompt.push_str(instructions);
        prompt.push('\n');
    }
    if let Some(directive) = directive {
        prompt.push('\n');
        prompt.push_str(directive);
        prompt.push('\n');
    }
    prompt
}

pub fn draft_config() -> GenerationConfig {
    GenerationConfig::default().with_temperature(0.7)
}

pub fn critique_prompt(request: &LetterRequest, draft: &str) -> String {
    format!(
        "You review cover letters before they are sent.\n\n\
         Rate the draft below on this ladder: Reject, Weak, Average, Strong, Exceptional. \
         List the concrete changes that would move it up the ladder as feedback, and list \
         every claim the resume does not support as a hallucination.\n\n\
         Role:\n{}\n\n\
         Resume:\n{}\n\n\
         Draft:\n{}\n\n\
         Answer with a single JSON object with fields decision, feedback and hallucinations.",
        request.job_description, request.resume, draft
    )
}

pub fn critique_config() -> GenerationConfig {
    GenerationConfig::json()
        .with_temperature(0.2)
        .with_schema(schema_for::<Critique>())
}

/// Revision notes appended to a regeneration prompt. Embeds the verdict,
/// the critic's feedback and any unsupported claims it flagged.
pub fn improvement_directive(critique: &Critique) -> String {
    let mut directive = format!(
        "Revision notes. Your previous draft was rated {:?}.",
        critique.decision
    );
    if !critique.feedback.is_empty() {
        directive.push_str("\nAddress each point:\n");
        for item in &critique.feedback {
            directive.push_str("- ");
            directive.push_str(item);
            directive.push('\n');
        }
    }
    if !critique.hallucinations.is_empty() {
        directive.push_str("\nRemove or rewrite these unsupported claims:\n");
        for claim in &critique.hallucinations {
            directive.push_str("- ");
            directive.push_str(claim);
            directive.push('\n');
        }
    }
    directive
}

fn schema_for<T: schemars::JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).expect("derived schema serializes")
}
