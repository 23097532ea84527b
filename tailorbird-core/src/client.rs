use crate::{InferenceRequest, InferenceResult, TailorbirdError};

/// The single seam between orchestration and the inference provider.
/// Both the direct Gemini client and the server-side proxy client
/// implement this, so retry and feature code never know which one is
/// active.
#[async_trait::async_trait]
pub trait InferenceClient: Send + Sync + 'static {
    async fn generate(&self, request: InferenceRequest)
        -> Result<InferenceResult, TailorbirdError>;
}
