//! The shared runtime every feature call goes through: model resolution,
//! the retry executor, response capture for telemetry, and JSON parsing
//! of structured outputs.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tailorbird_core::{
    parse_model_json, CallContext, InferenceClient, InferenceRequest, ModelCatalog, ProgressHook,
    RetryExecutor, RetryPolicy, TailorbirdError, TaskClass, TelemetrySink, UserTier,
};

pub struct InferenceRuntime {
    client: Arc<dyn InferenceClient>,
    catalog: ModelCatalog,
    executor: RetryExecutor,
    progress: Option<ProgressHook>,
    user_id: Option<String>,
}

impl InferenceRuntime {
    pub fn new(client: Arc<dyn InferenceClient>, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            client,
            catalog: ModelCatalog::default(),
            executor: RetryExecutor::new(telemetry),
            progress: None,
            user_id: None,
        }
    }

    pub fn with_catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.executor = self.executor.with_policy(policy);
        self
    }

    /// Session user attached to every telemetry record issued through
    /// this runtime.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Hook invoked once per scheduled retry, typically surfaced to the
    /// user as a "still working" notice.
    pub fn with_progress(mut self, progress: ProgressHook) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn resolve_model(&self, tier: UserTier, task: TaskClass) -> &str {
        self.catalog.resolve(tier, task)
    }

    /// Runs one inference call under the retry policy. The response text
    /// and any token usage are captured into the attempt's telemetry
    /// record.
    pub async fn generate_text(
        &self,
        event_type: &str,
        request: InferenceRequest,
    ) -> Result<String, TailorbirdError> {
        let mut call = CallContext::new(event_type, request.model(), request.prompt_text());
        if let Some(user_id) = &self.user_id {
            call = call.with_user(user_id.clone());
        }

        let client = Arc::clone(&self.client);
        let result = self
            .executor
            .execute(call, self.progress.clone(), move |cx| {
                let client = Arc::clone(&client);
                let request = request.clone();
                async move {
                    let result = client.generate(request).await?;
                    if let Some(usage) = &result.usage {
                        cx.record_usage(usage.clone());
                    }
                    cx.record_response(result.text.clone());
                    Ok(result)
                }
            })
            .await?;
        Ok(result.text)
    }

    /// `generate_text` followed by fence cleanup and JSON parsing. A
    /// parse failure is not retried here; the inference itself already
    /// succeeded.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        event_type: &str,
        request: InferenceRequest,
    ) -> Result<T, TailorbirdError> {
        let text = self.generate_text(event_type, request).await?;
        parse_model_json(&text)
    }
}
