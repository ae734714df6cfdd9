//! REST API client for the Replicate prediction endpoints.
//!
//! Wraps prediction creation, status retrieval and cancellation using
//! [`reqwest`]. Authorization is a bearer token read from the process
//! environment on every call.

use async_trait::async_trait;

use crate::config::{ReplicateConfig, API_TOKEN_VAR};
use crate::prediction::CreatePrediction;
use crate::provider::{PredictionProvider, ProviderError};

/// HTTP client for a Replicate-compatible prediction API.
pub struct ReplicateApi {
    client: reqwest::Client,
    api_url: String,
    token_var: String,
}

impl ReplicateApi {
    /// Build a client with the configured request timeout.
    pub fn from_config(config: &ReplicateConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            token_var: config.token_var.clone(),
        })
    }

    // ---- private helpers ----

    /// Attach the bearer token the environment currently holds, if any.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = std::env::var(&self.token_var).ok();
        if token.as_deref().map_or(true, |t| t.trim().is_empty()) {
            tracing::warn!(
                token_var = %self.token_var,
                "Provider API token not set; request will be unauthenticated",
            );
        }
        with_bearer(request, token)
    }

    /// Read status and body text off a response.
    async fn read(response: reqwest::Response) -> Result<(u16, String), ProviderError> {
        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok((status, text))
    }
}

/// Add `Authorization: Bearer <token>` for a non-blank token.
///
/// A missing token is not an error here: the request goes out
/// unauthenticated and the provider rejects it.
fn with_bearer(
    request: reqwest::RequestBuilder,
    token: Option<String>,
) -> reqwest::RequestBuilder {
    match token {
        Some(token) if !token.trim().is_empty() => request.bearer_auth(token.trim()),
        _ => request,
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Creation replies pass through whenever the body is JSON, whatever the
/// status code; only a non-JSON error body becomes
/// [`ProviderError::ApiError`].
fn decode_creation_body(status: u16, text: String) -> Result<serde_json::Value, ProviderError> {
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => {
            if !is_success(status) {
                tracing::warn!(status, "Prediction creation returned an error status");
            }
            Ok(value)
        }
        Err(_) if !is_success(status) => Err(ProviderError::ApiError { status, body: text }),
        Err(e) => Err(ProviderError::Decode(e.to_string())),
    }
}

/// Status replies must be 2xx and JSON.
fn decode_status_body(status: u16, text: String) -> Result<serde_json::Value, ProviderError> {
    check_status(status, text.clone())?;
    serde_json::from_str(&text).map_err(|e| ProviderError::Decode(e.to_string()))
}

fn check_status(status: u16, body: String) -> Result<(), ProviderError> {
    if is_success(status) {
        Ok(())
    } else {
        Err(ProviderError::ApiError { status, body })
    }
}

#[async_trait]
impl PredictionProvider for ReplicateApi {
    /// Any JSON body is passed through regardless of status code; only a
    /// non-JSON error body becomes [`ProviderError::ApiError`].
    async fn create_prediction(
        &self,
        body: &CreatePrediction,
    ) -> Result<serde_json::Value, ProviderError> {
        let response = self
            .authorize(self.client.post(format!("{}/predictions", self.api_url)))
            .json(body)
            .send()
            .await?;

        let (status, text) = Self::read(response).await?;
        decode_creation_body(status, text)
    }

    async fn get_prediction(&self, id: &str) -> Result<serde_json::Value, ProviderError> {
        let response = self
            .authorize(self.client.get(format!("{}/predictions/{}", self.api_url, id)))
            .send()
            .await?;

        let (status, text) = Self::read(response).await?;
        decode_status_body(status, text)
    }

    async fn cancel_prediction(&self, id: &str) -> Result<(), ProviderError> {
        let response = self
            .authorize(
                self.client
                    .post(format!("{}/predictions/{}/cancel", self.api_url, id)),
            )
            .send()
            .await?;

        let (status, text) = Self::read(response).await?;
        check_status(status, text)
    }
}
