//! PII scrubbing for prompt and response text. Applied before a record
//! leaves the process; the in-memory record handed to the sink keeps
//! its original text.

use std::sync::OnceLock;

use regex::Regex;

const EMAIL_REDACTED: &str = "[email redacted]";
const PHONE_REDACTED: &str = "[phone redacted]";
const MAX_FIELD_BYTES: usize = 100_000;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email pattern")
    })
}

fn phone_pattern() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"\+?\d[\d\s().-]{7,}\d").expect("valid phone pattern"))
}

/// Replaces email addresses and phone-number-shaped substrings, then
/// bounds the field size. Resumes routinely carry both.
pub fn redact_pii(text: &str) -> String {
    let scrubbed = email_pattern().replace_all(text, EMAIL_REDACTED);
    let scrubbed = phone_pattern().replace_all(&scrubbed, PHONE_REDACTED);
    truncate(&scrubbed, MAX_FIELD_BYTES)
}

fn truncate(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut end = 0;
    for (idx, _) in text.char_indices() {
        if idx <= max_bytes {
            end = idx;
        } else {
            break;
        }
    }
    text[..end].to_string()
}
