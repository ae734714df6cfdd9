//! Provider seam between the job lifecycle and the HTTP transport.

use async_trait::async_trait;

use crate::prediction::CreatePrediction;

/// Errors from the provider transport layer.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body was not valid JSON.
    #[error("Undecodable provider response: {0}")]
    Decode(String),
}

/// Operations the generation flow needs from a prediction provider.
///
/// Responses are returned as raw JSON; classification happens in the
/// submitter and poller.
#[async_trait]
pub trait PredictionProvider: Send + Sync {
    /// `POST /predictions`. Returns the provider's body unmodified, including
    /// JSON error bodies sent with a non-2xx status.
    async fn create_prediction(
        &self,
        body: &CreatePrediction,
    ) -> Result<serde_json::Value, ProviderError>;

    /// `GET /predictions/{id}`.
    async fn get_prediction(&self, id: &str) -> Result<serde_json::Value, ProviderError>;

    /// `POST /predictions/{id}/cancel`.
    async fn cancel_prediction(&self, id: &str) -> Result<(), ProviderError>;
}
