use thiserror::Error;

#[derive(Debug, Error)]
pub enum TailorbirdError {
    #[error("daily request quota exhausted: {0}")]
    DailyQuotaExceeded(String),
    #[error("rate limited after {attempts} attempts: {message}")]
    RateLimited { attempts: u32, message: String },
    #[error("AI provider failed: {0}")]
    Provider(String),
    #[error("proxy relay failed: {0}")]
    Proxy(String),
    #[error("parsing failed on output '{output}': {reason}")]
    ParseFailed { output: String, reason: String },
    #[error("analysis produced no meaningful insight")]
    EmptyInsight,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("serialization/deserialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Translates an error into the copy shown to the end user. Feature
/// boundaries call this once, after retry and classification have run;
/// the raw provider message never reaches the UI.
pub fn user_facing_message(error: &TailorbirdError) -> String {
    match error {
        TailorbirdError::DailyQuotaExceeded(_) => {
            "You've reached today's free AI quota. It resets at midnight Pacific time, \
             or you can upgrade your plan for higher limits."
                .to_string()
        }
        TailorbirdError::RateLimited { attempts, .. } => format!(
            "The AI service is handling heavy traffic right now. We retried {attempts} times \
             without success; please try again in a few minutes."
        ),
        TailorbirdError::Provider(message) | TailorbirdError::Proxy(message) => {
            translate_provider_message(message)
        }
        TailorbirdError::ParseFailed { .. } | TailorbirdError::Serde(_) => {
            "The AI returned a response we couldn't read. Please try again.".to_string()
        }
        TailorbirdError::EmptyInsight => {
            "The analysis didn't surface meaningful insight for this posting. \
             Try again with a fuller job description."
                .to_string()
        }
        TailorbirdError::InvalidConfig(_) => {
            "The AI service isn't configured for this deployment. Please contact support."
                .to_string()
        }
    }
}

fn translate_provider_message(message: &str) -> String {
    let lowered = message.to_lowercase();
    if lowered.contains("api key") || lowered.contains("api_key") || lowered.contains("permission")
    {
        "The AI service rejected this deployment's credentials. Please contact support."
            .to_string()
    } else if lowered.contains("503") || lowered.contains("overloaded") || lowered.contains("unavailable")
    {
        "The AI model is temporarily overloaded. Please try again shortly.".to_string()
    } else if lowered.contains("safety") || lowered.contains("blocked") {
        "The request was declined by the provider's content filters.".to_string()
    } else {
        "The AI service couldn't complete this request. Please try again.".to_string()
    }
}
