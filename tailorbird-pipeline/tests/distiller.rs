use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tailorbird_core::{
    InferenceClient, InferenceRequest, InferenceResult, NoopTelemetry, ResponseFormat,
    TailorbirdError, UserTier,
};
use tailorbird_pipeline::{InferenceRuntime, JobDistiller};

struct ScriptedClient {
    responses: Mutex<VecDeque<Result<InferenceResult, TailorbirdError>>>,
    requests: Mutex<Vec<InferenceRequest>>,
}

impl ScriptedClient {
    fn new(responses: Vec<Result<InferenceResult, TailorbirdError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn text(text: impl Into<String>) -> Result<InferenceResult, TailorbirdError> {
        Ok(InferenceResult {
            text: text.into(),
            usage: None,
        })
    }

    fn requests(&self) -> Vec<InferenceRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceClient for ScriptedClient {
    async fn generate(
        &self,
        request: InferenceRequest,
    ) -> Result<InferenceResult, TailorbirdError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TailorbirdError::Provider("script exhausted".to_string())))
    }
}

fn distiller(client: Arc<ScriptedClient>) -> JobDistiller {
    let runtime = InferenceRuntime::new(client, Arc::new(NoopTelemetry));
    JobDistiller::new(Arc::new(runtime))
}

const JOB: &str = "Senior Backend Engineer at Acme, must know Go and Postgres";
const RESUME: &str = "5 years Go, 3 years Postgres";

#[tokio::test]
async fn distills_both_passes_and_merges() {
    let extraction = json!({
        "companyName": "Acme",
        "roleTitle": "Senior Backend Engineer",
        "isAiBanned": false
    })
    .to_string();
    let analysis = format!(
        "```json\n{}\n```",
        json!({
            "compatibilityScore": 0.75,
            "keySkills": ["Go", "Postgres"],
            "coreResponsibilities": ["Design and run backend services"],
            "matchSummary": "Strong fit on the core stack."
        })
    );
    let client = Arc::new(ScriptedClient::new(vec![
        ScriptedClient::text(extraction),
        ScriptedClient::text(analysis),
    ]));

    let job = distiller(client.clone())
        .distill(JOB, RESUME, UserTier::Free)
        .await
        .unwrap();

    assert_eq!(job.company_name.as_deref(), Some("Acme"));
    assert_eq!(job.role_title.as_deref(), Some("Senior Backend Engineer"));
    assert_eq!(job.key_skills, vec!["Go", "Postgres"]);
    assert_eq!(job.compatibility_score, Some(0.75));
    assert!(!job.is_ai_banned);

    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].model(), "gemini-2.0-flash-lite");
    assert_eq!(requests[0].generation().temperature, Some(0.1));
    assert_eq!(requests[0].generation().response_format, ResponseFormat::Json);
    assert!(requests[0].generation().response_schema.is_some());
    assert!(requests[0].prompt_text().contains(JOB));
    assert_eq!(requests[1].model(), "gemini-2.0-flash");
    assert_eq!(requests[1].generation().temperature, Some(0.4));
    assert!(requests[1].prompt_text().contains(RESUME));
}

#[tokio::test]
async fn pro_tier_resolves_pro_models() {
    let client = Arc::new(ScriptedClient::new(vec![
        ScriptedClient::text(json!({"companyName": "Acme"}).to_string()),
        ScriptedClient::text(json!({"compatibilityScore": 0.5, "keySkills": ["Go"]}).to_string()),
    ]));

    distiller(client.clone())
        .distill(JOB, RESUME, UserTier::Pro)
        .await
        .unwrap();

    let requests = client.requests();
    assert_eq!(requests[0].model(), "gemini-2.5-flash");
    assert_eq!(requests[1].model(), "gemini-2.5-pro");
}

#[tokio::test]
async fn safety_verdict_survives_analysis_override() {
    let client = Arc::new(ScriptedClient::new(vec![
        ScriptedClient::text(
            json!({
                "isAiBanned": true,
                "aiBanReason": "Applications drafted with AI will be rejected."
            })
            .to_string(),
        ),
        ScriptedClient::text(
            json!({
                "isAiBanned": false,
                "compatibilityScore": 0.5,
                "keySkills": ["Go"]
            })
            .to_string(),
        ),
    ]));

    let job = distiller(client)
        .distill(JOB, RESUME, UserTier::Plus)
        .await
        .unwrap();

    assert!(job.is_ai_banned);
    assert_eq!(
        job.ai_ban_reason.as_deref(),
        Some("Applications drafted with AI will be rejected.")
    );
}

#[tokio::test]
async fn degenerate_analysis_is_rejected() {
    let client = Arc::new(ScriptedClient::new(vec![
        ScriptedClient::text(json!({"companyName": "Acme"}).to_string()),
        ScriptedClient::text(json!({"matchSummary": "Nothing useful."}).to_string()),
    ]));

    let error = distiller(client)
        .distill(JOB, RESUME, UserTier::Free)
        .await
        .unwrap_err();

    assert!(matches!(error, TailorbirdError::EmptyInsight));
}

#[tokio::test]
async fn extraction_failure_aborts_before_analysis() {
    let client = Arc::new(ScriptedClient::new(vec![Err(TailorbirdError::Provider(
        "API key not valid".to_string(),
    ))]));

    let error = distiller(client.clone())
        .distill(JOB, RESUME, UserTier::Free)
        .await
        .unwrap_err();

    assert!(matches!(error, TailorbirdError::Provider(_)));
    assert_eq!(client.requests().len(), 1);
}

#[tokio::test]
async fn malformed_analysis_surfaces_a_parse_failure() {
    let client = Arc::new(ScriptedClient::new(vec![
        ScriptedClient::text(json!({"companyName": "Acme"}).to_string()),
        ScriptedClient::text("Sure! Here are my thoughts on this role."),
    ]));

    let error = distiller(client)
        .distill(JOB, RESUME, UserTier::Free)
        .await
        .unwrap_err();

    assert!(matches!(error, TailorbirdError::ParseFailed { .. }));
}
