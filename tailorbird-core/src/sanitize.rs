//! Cleanup for model responses that wrap their JSON payload in markdown.
//!
//! Gemini frequently fences structured output (```json … ```), sometimes
//! with leading or trailing prose, and truncated responses can leave a
//! lone fence at either end. `clean_model_output` reduces all of these to
//! the bare payload and never fails; an empty result is the caller's
//! parse failure, not ours.

use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::TailorbirdError;

fn fenced_block() -> &'static Regex {
    static FENCED: OnceLock<Regex> = OnceLock::new();
    FENCED.get_or_init(|| {
        Regex::new(r"(?is)```(?:json)?\s*(.*?)\s*```").expect("valid fence pattern")
    })
}

pub fn clean_model_output(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Some(captures) = fenced_block().captures(trimmed) {
        if let Some(body) = captures.get(1) {
            return body.as_str().trim().to_string();
        }
    }

    // No complete fence pair. Strip a dangling opener and a dangling
    // closer independently so truncated output still parses.
    let mut remainder = strip_opening_fence(trimmed);
    if let Some(rest) = remainder.strip_suffix("```") {
        remainder = rest;
    }
    remainder.trim().to_string()
}

fn strip_opening_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    }
}

/// Cleans then parses a model response as JSON.
pub fn parse_model_json<T: DeserializeOwned>(raw: &str) -> Result<T, TailorbirdError> {
    let cleaned = clean_model_output(raw);
    serde_json::from_str(&cleaned).map_err(|err| TailorbirdError::ParseFailed {
        output: cleaned,
        reason: err.to_string(),
    })
}
