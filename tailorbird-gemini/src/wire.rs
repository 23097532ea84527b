//! Request and response bodies for the generateContent wire format,
//! shared by the direct client and the proxy relay payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use tailorbird_core::{
    ContentPart, GenerationConfig, InferenceRequest, InferenceResult, ResponseFormat,
    TailorbirdError, TokenUsage,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfigBody>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfigBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

impl From<UsageMetadata> for TokenUsage {
    fn from(usage: UsageMetadata) -> Self {
        TokenUsage {
            prompt_tokens: usage.prompt_token_count,
            completion_tokens: usage.candidates_token_count,
            total_tokens: usage.total_token_count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiErrorResponse {
    pub error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiErrorDetail {
    pub message: String,
}

pub(crate) fn map_parts(parts: &[ContentPart]) -> Vec<Part> {
    parts
        .iter()
        .map(|part| match part {
            ContentPart::Text(text) => Part {
                text: Some(text.clone()),
                inline_data: None,
            },
            ContentPart::Inline { mime_type, data } => Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: mime_type.clone(),
                    data: data.clone(),
                }),
            },
        })
        .collect()
}

pub(crate) fn map_contents(request: &InferenceRequest) -> Vec<Content> {
    vec![Content {
        role: Some("user".to_string()),
        parts: map_parts(request.parts()),
    }]
}

pub(crate) fn map_generation_config(config: &GenerationConfig) -> Option<GenerationConfigBody> {
    let response_mime_type = match config.response_format {
        ResponseFormat::Json => Some("application/json".to_string()),
        ResponseFormat::Text => None,
    };
    let body = GenerationConfigBody {
        temperature: config.temperature,
        max_output_tokens: config.max_output_tokens,
        response_mime_type,
        response_schema: config.response_schema.clone(),
    };
    if body.temperature.is_none()
        && body.max_output_tokens.is_none()
        && body.response_mime_type.is_none()
        && body.response_schema.is_none()
    {
        None
    } else {
        Some(body)
    }
}

pub(crate) fn is_blocked_finish_reason(reason: &str) -> bool {
    matches!(reason, "SAFETY" | "RECITATION" | "BLOCKLIST")
}

/// Collapses a generateContent response into the text plus usage the
/// rest of the system consumes. A candidate with no text and a blocking
/// finish reason is a provider failure; partial text survives.
pub(crate) fn into_result(
    response: GenerateContentResponse,
) -> Result<InferenceResult, TailorbirdError> {
    let usage = response.usage_metadata.map(TokenUsage::from);
    let candidate = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .ok_or_else(|| TailorbirdError::Provider("No candidates in response".to_string()))?;

    let finish_reason = candidate.finish_reason;
    let text = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty()
        && finish_reason
            .as_deref()
            .map(is_blocked_finish_reason)
            .unwrap_or(false)
    {
        let reason = finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(TailorbirdError::Provider(format!(
            "Generation blocked: {reason}"
        )));
    }

    Ok(InferenceResult { text, usage })
}
