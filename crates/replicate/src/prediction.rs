//! Prediction wire types and status normalization.
//!
//! The provider reports job state as a free-form string. This module maps
//! it onto the closed [`JobStatus`] set, keeping anything unrecognized as
//! [`JobStatus::Unknown`] so new transient states never end a poll loop.

use plates_core::generation::GenerationSettings;
use plates_core::types::Timestamp;
use serde::{Deserialize, Serialize};

/// Body of `POST /predictions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePrediction {
    /// Model version identifier.
    pub version: String,
    pub input: PredictionInput,
}

/// The `input` object of a prediction request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionInput {
    pub prompt: String,
    #[serde(flatten)]
    pub settings: GenerationSettings,
}

/// Normalized job state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    /// Accepted, waiting for a worker (`starting` is folded in here).
    Queued,
    Processing,
    Succeeded,
    /// Terminal failure; provider-side cancellation is folded in here.
    Failed,
    /// Any value outside the known vocabulary. Never terminal.
    Unknown(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for JobStatus {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "queued" | "starting" => Self::Queued,
            "processing" => Self::Processing,
            "succeeded" => Self::Succeeded,
            "failed" | "canceled" | "cancelled" => Self::Failed,
            _ => Self::Unknown(raw.to_string()),
        }
    }
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submitted job, as far as this client needs to know it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    /// Provider-assigned prediction id. Opaque.
    pub id: String,
    /// Status reported in the submission response.
    pub status: JobStatus,
}

/// Body of `GET /predictions/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub id: Option<String>,
    pub status: JobStatus,
    /// Output asset URLs; present once the job has succeeded.
    #[serde(default)]
    pub output: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
}

impl Prediction {
    /// First output URL, if any non-blank one exists.
    pub fn first_output(&self) -> Option<&str> {
        self.output
            .as_ref()
            .and_then(|urls| urls.first())
            .map(String::as_str)
            .filter(|url| !url.trim().is_empty())
    }

    /// Time the provider spent on the job, once it has completed.
    pub fn provider_duration_ms(&self) -> Option<i64> {
        let created = self.created_at?;
        let completed = self.completed_at?;
        Some((completed - created).num_milliseconds())
    }

    /// Provider-supplied failure detail, when present.
    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.trim().is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Parse a status response body into a [`Prediction`].
pub fn parse_prediction(raw: serde_json::Value) -> Result<Prediction, serde_json::Error> {
    serde_json::from_value(raw)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn known_statuses_normalize() {
        assert_eq!(JobStatus::from("starting"), JobStatus::Queued);
        assert_eq!(JobStatus::from("queued"), JobStatus::Queued);
        assert_eq!(JobStatus::from("processing"), JobStatus::Processing);
        assert_eq!(JobStatus::from("Succeeded"), JobStatus::Succeeded);
        assert_eq!(JobStatus::from("failed"), JobStatus::Failed);
        assert_eq!(JobStatus::from("canceled"), JobStatus::Failed);
    }

    #[test]
    fn unrecognized_status_is_unknown_and_not_terminal() {
        let status = JobStatus::from("warming_up");
        assert_eq!(status, JobStatus::Unknown("warming_up".into()));
        assert!(!status.is_terminal());
        assert_eq!(status.to_string(), "warming_up");
    }

    #[test]
    fn only_succeeded_and_failed_are_terminal() {
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
    }

    #[test]
    fn create_body_flattens_settings_into_input() {
        let body = CreatePrediction {
            version: "v1".into(),
            input: PredictionInput {
                prompt: "p".into(),
                settings: GenerationSettings::default(),
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["version"], "v1");
        assert_eq!(value["input"]["prompt"], "p");
        assert_eq!(value["input"]["num_outputs"], 1);
        assert_eq!(value["input"]["width"], 768);
        assert_eq!(value["input"]["height"], 768);
        assert_eq!(value["input"]["num_inference_steps"], 30);
        assert_eq!(value["input"]["guidance_scale"], 7.5);
        assert!(value["input"]["negative_prompt"]
            .as_str()
            .unwrap()
            .contains("watermark"));
    }

    #[test]
    fn parse_succeeded_prediction() {
        let raw = json!({
            "id": "abc",
            "status": "succeeded",
            "output": ["https://x/y.png", "https://x/z.png"],
            "created_at": "2024-05-01T10:00:00.123456Z",
            "completed_at": null,
        });
        let prediction = parse_prediction(raw).unwrap();
        assert_eq!(prediction.status, JobStatus::Succeeded);
        assert_eq!(prediction.first_output(), Some("https://x/y.png"));
        assert!(prediction.provider_duration_ms().is_none());
    }

    #[test]
    fn provider_duration_from_timestamps() {
        let prediction = parse_prediction(json!({
            "status": "succeeded",
            "output": ["https://x/y.png"],
            "created_at": "2024-05-01T10:00:00Z",
            "completed_at": "2024-05-01T10:00:07.250Z",
        }))
        .unwrap();
        assert_eq!(prediction.provider_duration_ms(), Some(7250));
    }

    #[test]
    fn parse_processing_without_output() {
        let prediction = parse_prediction(json!({"status": "processing"})).unwrap();
        assert_eq!(prediction.status, JobStatus::Processing);
        assert!(prediction.first_output().is_none());
        assert!(prediction.error_message().is_none());
    }

    #[test]
    fn empty_output_list_has_no_first_output() {
        let prediction = parse_prediction(json!({"status": "succeeded", "output": []})).unwrap();
        assert!(prediction.first_output().is_none());
    }

    #[test]
    fn error_message_variants() {
        let p = parse_prediction(json!({"status": "failed", "error": "CUDA OOM"})).unwrap();
        assert_eq!(p.error_message().as_deref(), Some("CUDA OOM"));

        let p = parse_prediction(json!({"status": "failed", "error": null})).unwrap();
        assert!(p.error_message().is_none());
    }

    #[test]
    fn missing_status_fails_to_parse() {
        assert!(parse_prediction(json!({"id": "abc"})).is_err());
    }
}
