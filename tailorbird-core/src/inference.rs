use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One ordered block of request content. Binary payloads (resume PDFs
/// passed straight through from upload) travel base64-encoded next to
/// the prompt text.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ContentPart {
    Text(String),
    Inline { mime_type: String, data: String },
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub response_format: ResponseFormat,
    pub response_schema: Option<Value>,
}

impl GenerationConfig {
    pub fn json() -> Self {
        Self {
            response_format: ResponseFormat::Json,
            ..Self::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// A fully-described inference call. Immutable once built: the builder
/// methods consume `self` and there are no mutators, so a request handed
/// to a client cannot change under it.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct InferenceRequest {
    model: String,
    parts: Vec<ContentPart>,
    generation: GenerationConfig,
}

impl InferenceRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            parts: Vec::new(),
            generation: GenerationConfig::default(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(ContentPart::Text(text.into()));
        self
    }

    pub fn with_inline(mut self, mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        self.parts.push(ContentPart::Inline {
            mime_type: mime_type.into(),
            data: data.into(),
        });
        self
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn parts(&self) -> &[ContentPart] {
        &self.parts
    }

    pub fn generation(&self) -> &GenerationConfig {
        &self.generation
    }

    /// Concatenation of the text blocks, used for telemetry and prompt
    /// auditing. Inline blocks are represented by a placeholder rather
    /// than their base64 payload.
    pub fn prompt_text(&self) -> String {
        let mut rendered = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            match part {
                ContentPart::Text(text) => rendered.push(text.clone()),
                ContentPart::Inline { mime_type, .. } => {
                    rendered.push(format!("[inline {mime_type}]"))
                }
            }
        }
        rendered.join("\n")
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct InferenceResult {
    pub text: String,
    pub usage: Option<TokenUsage>,
}
