//! Integration tests for job submission.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use plates_core::generation::GenerationSettings;
use plates_core::request::GenerationRequest;
use plates_core::types::GenerationKind;
use plates_replicate::error::GenerationError;
use plates_replicate::prediction::JobStatus;
use plates_replicate::provider::ProviderError;
use plates_replicate::submitter::JobSubmitter;
use serde_json::json;

use common::ScriptedProvider;

const VERSION: &str = "test-version";

fn submitter(provider: &Arc<ScriptedProvider>) -> JobSubmitter<ScriptedProvider> {
    JobSubmitter::new(Arc::clone(provider), VERSION)
}

#[tokio::test]
async fn submit_returns_raw_response_after_one_call() {
    let raw = json!({
        "id": "pred-42",
        "status": "starting",
        "urls": {"get": "https://api/predictions/pred-42"},
        "extra": [1, 2, 3],
    });
    let provider = Arc::new(ScriptedProvider::new().with_create(Ok(raw.clone())));

    let response = submitter(&provider)
        .submit(GenerationKind::ColoringPlate, &GenerationRequest::from_prompt("a whale"))
        .await
        .unwrap();

    assert_eq!(response, raw);
    assert_eq!(provider.create_count(), 1);
}

#[tokio::test]
async fn submit_passes_provider_error_body_through() {
    let raw = json!({"detail": "Invalid version or not permitted", "status": 422});
    let provider = Arc::new(ScriptedProvider::new().with_create(Ok(raw.clone())));

    let response = submitter(&provider)
        .submit(GenerationKind::ColoringPlate, &GenerationRequest::from_prompt("a whale"))
        .await
        .unwrap();

    assert_eq!(response, raw);
}

#[tokio::test]
async fn submit_body_carries_prompt_and_fixed_parameters() {
    let provider = Arc::new(ScriptedProvider::new());

    submitter(&provider)
        .submit(GenerationKind::ColoringPlate, &GenerationRequest::from_prompt("a whale"))
        .await
        .unwrap();

    let creates = provider.creates.lock().unwrap();
    let body = serde_json::to_value(&creates[0]).unwrap();
    assert_eq!(body["version"], VERSION);
    assert_eq!(
        body["input"]["prompt"],
        "Create a line art coloring page in black and white of: a whale. \
         Make it suitable for coloring with clear, well-defined lines. \
         Style: line art, black and white"
    );
    assert_eq!(
        body["input"]["negative_prompt"],
        "blurry, bad, text, watermark, signature, color, photorealistic, shadows, gradient"
    );
    assert_eq!(body["input"]["num_outputs"], 1);
    assert_eq!(body["input"]["width"], 768);
    assert_eq!(body["input"]["height"], 768);
    assert_eq!(body["input"]["num_inference_steps"], 30);
    assert_eq!(body["input"]["guidance_scale"], 7.5);
}

#[tokio::test]
async fn empty_request_is_rejected_without_network_call() {
    let provider = Arc::new(ScriptedProvider::new());

    let result = submitter(&provider)
        .submit(GenerationKind::Mandala, &GenerationRequest::default())
        .await;

    assert_matches!(result, Err(GenerationError::InvalidInput(_)));
    assert_eq!(provider.create_count(), 0);
}

#[tokio::test]
async fn blank_answers_are_still_submitted_once() {
    let provider = Arc::new(ScriptedProvider::new());
    let request: GenerationRequest = [("mood", "   ")].into_iter().collect();

    let response = submitter(&provider)
        .submit(GenerationKind::ColoringPlate, &request)
        .await;

    assert!(response.is_ok());
    assert_eq!(provider.create_count(), 1);
}

#[tokio::test]
async fn invalid_settings_are_rejected_without_network_call() {
    let provider = Arc::new(ScriptedProvider::new());
    let settings = GenerationSettings {
        width: 0,
        ..Default::default()
    };

    let result = JobSubmitter::new(Arc::clone(&provider), VERSION)
        .with_settings(settings)
        .submit(GenerationKind::ColoringPlate, &GenerationRequest::from_prompt("x"))
        .await;

    assert_matches!(result, Err(GenerationError::InvalidInput(_)));
    assert_eq!(provider.create_count(), 0);
}

#[tokio::test]
async fn transport_failure_propagates() {
    let provider = Arc::new(ScriptedProvider::new().with_create(Err(ProviderError::ApiError {
        status: 503,
        body: "unavailable".into(),
    })));

    let result = submitter(&provider)
        .submit(GenerationKind::ColoringPlate, &GenerationRequest::from_prompt("x"))
        .await;

    assert_matches!(result, Err(GenerationError::Transport(_)));
    assert_eq!(provider.create_count(), 1);
}

#[tokio::test]
async fn submit_job_classifies_handle() {
    let provider = Arc::new(ScriptedProvider::new());

    let handle = submitter(&provider)
        .submit_job(GenerationKind::ColoringPlate, &GenerationRequest::from_prompt("x"))
        .await
        .unwrap();

    assert_eq!(handle.id, "pred-1");
    assert_eq!(handle.status, JobStatus::Queued);
}

#[tokio::test]
async fn submit_job_turns_error_body_into_job_failure() {
    let provider = Arc::new(
        ScriptedProvider::new().with_create(Ok(json!({"detail": "Invalid version"}))),
    );

    let result = submitter(&provider)
        .submit_job(GenerationKind::ColoringPlate, &GenerationRequest::from_prompt("x"))
        .await;

    assert_matches!(result, Err(GenerationError::ProviderJobFailed(msg)) if msg == "Invalid version");
}

#[tokio::test]
async fn mandala_prompt_is_built_from_answers() {
    let provider = Arc::new(ScriptedProvider::new());
    let request: GenerationRequest = [("mood", "joyful"), ("shape", "flower")]
        .into_iter()
        .collect();

    submitter(&provider)
        .submit(GenerationKind::Mandala, &request)
        .await
        .unwrap();

    let prompt = provider.creates.lock().unwrap()[0].input.prompt.clone();
    assert!(prompt.contains("mandala"));
    assert!(prompt.contains("mood: joyful"));
    assert!(prompt.contains("shape: flower"));
}
