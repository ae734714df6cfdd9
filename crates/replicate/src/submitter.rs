//! Job submission.
//!
//! Turns a [`GenerationRequest`] into a prediction body and sends it to the
//! provider exactly once.

use std::sync::Arc;

use plates_core::generation::GenerationSettings;
use plates_core::prompt::build_prompt;
use plates_core::request::GenerationRequest;
use plates_core::types::GenerationKind;

use crate::error::GenerationError;
use crate::prediction::{CreatePrediction, JobHandle, JobStatus, PredictionInput};
use crate::provider::PredictionProvider;

/// Sends generation requests to a prediction provider.
pub struct JobSubmitter<P> {
    provider: Arc<P>,
    model_version: String,
    settings: GenerationSettings,
}

impl<P: PredictionProvider> JobSubmitter<P> {
    pub fn new(provider: Arc<P>, model_version: impl Into<String>) -> Self {
        Self {
            provider,
            model_version: model_version.into(),
            settings: GenerationSettings::default(),
        }
    }

    /// Replace the fixed sampler settings.
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the request body without sending it.
    pub fn build_body(
        &self,
        kind: GenerationKind,
        request: &GenerationRequest,
    ) -> Result<CreatePrediction, GenerationError> {
        request.validate()?;
        self.settings.validate()?;
        let prompt = build_prompt(kind, request);

        Ok(CreatePrediction {
            version: self.model_version.clone(),
            input: PredictionInput {
                prompt,
                settings: self.settings.clone(),
            },
        })
    }

    /// Send the request and return the provider's response unmodified.
    ///
    /// Invalid requests fail with [`GenerationError::InvalidInput`] before
    /// any network call. Provider error bodies are returned as-is; use
    /// [`submit_job`](Self::submit_job) to have them classified.
    pub async fn submit(
        &self,
        kind: GenerationKind,
        request: &GenerationRequest,
    ) -> Result<serde_json::Value, GenerationError> {
        let body = self.build_body(kind, request)?;

        tracing::info!(
            kind = %kind,
            version = %body.version,
            prompt = %body.input.prompt,
            "Submitting prediction",
        );

        let response = self.provider.create_prediction(&body).await?;

        tracing::info!(
            kind = %kind,
            prediction_id = response.get("id").and_then(|v| v.as_str()).unwrap_or("<none>"),
            status = response.get("status").and_then(|v| v.as_str()).unwrap_or("<none>"),
            "Prediction submitted",
        );

        Ok(response)
    }

    /// Submit and classify the response into a [`JobHandle`].
    pub async fn submit_job(
        &self,
        kind: GenerationKind,
        request: &GenerationRequest,
    ) -> Result<JobHandle, GenerationError> {
        let raw = self.submit(kind, request).await?;
        classify_submission(&raw)
    }
}

/// Classify a raw submission response.
///
/// * `id` present and status not failed -> [`JobHandle`]; a missing status
///   is taken as queued.
/// * status failed, or an error body without `id` ->
///   [`GenerationError::ProviderJobFailed`] with the provider's detail.
/// * anything else -> [`GenerationError::MalformedResult`].
pub fn classify_submission(raw: &serde_json::Value) -> Result<JobHandle, GenerationError> {
    let status = raw
        .get("status")
        .and_then(|v| v.as_str())
        .map(JobStatus::from)
        .unwrap_or(JobStatus::Queued);
    let id = raw
        .get("id")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|id| !id.is_empty());

    if status == JobStatus::Failed {
        return Err(GenerationError::ProviderJobFailed(
            provider_detail(raw).unwrap_or_else(|| "prediction failed at submission".into()),
        ));
    }

    match id {
        Some(id) => Ok(JobHandle {
            id: id.to_string(),
            status,
        }),
        None => match provider_detail(raw) {
            Some(detail) => Err(GenerationError::ProviderJobFailed(detail)),
            None => Err(GenerationError::MalformedResult(
                "submission response has no prediction id".into(),
            )),
        },
    }
}

/// Pull a human-readable error out of a provider body.
fn provider_detail(raw: &serde_json::Value) -> Option<String> {
    ["error", "detail", "title"].iter().find_map(|key| match raw.get(*key)? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Null | serde_json::Value::String(_) => None,
        other => Some(other.to_string()),
    })
}
