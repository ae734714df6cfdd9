//! One-call generation: submit, then poll to completion.

use std::sync::Arc;

use plates_core::request::GenerationRequest;
use plates_core::types::GenerationKind;
use tokio_util::sync::CancellationToken;

use crate::api::ReplicateApi;
use crate::config::{PollConfig, ReplicateConfig};
use crate::error::GenerationError;
use crate::poller::JobPoller;
use crate::provider::PredictionProvider;
use crate::submitter::JobSubmitter;

/// Submits a generation and waits for its output URL.
///
/// Cheap to share behind an `Arc`; concurrent calls to
/// [`generate`](Self::generate) each own their handle and poll loop.
pub struct ImageGenerator<P> {
    submitter: JobSubmitter<P>,
    poller: JobPoller<P>,
}

impl<P: PredictionProvider> ImageGenerator<P> {
    pub fn new(provider: Arc<P>, model_version: impl Into<String>, poll: PollConfig) -> Self {
        Self {
            submitter: JobSubmitter::new(Arc::clone(&provider), model_version),
            poller: JobPoller::new(provider, poll),
        }
    }

    /// Run one generation end to end and return the asset URL.
    ///
    /// A token cancelled before or during submission yields
    /// [`GenerationError::Cancelled`]; a job that was already created is
    /// left to the provider in that case.
    pub async fn generate(
        &self,
        kind: GenerationKind,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, GenerationError> {
        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        let handle = tokio::select! {
            _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
            handle = self.submitter.submit_job(kind, request) => handle?,
        };

        tracing::info!(
            kind = %kind,
            prediction_id = %handle.id,
            status = %handle.status,
            "Generation started",
        );

        self.poller.poll_until_done(&handle, cancel).await
    }
}

impl ImageGenerator<ReplicateApi> {
    /// Build a generator against the real provider.
    pub fn replicate(config: &ReplicateConfig, poll: PollConfig) -> Result<Self, GenerationError> {
        let api = Arc::new(ReplicateApi::from_config(config)?);
        Ok(Self::new(api, config.model_version.clone(), poll))
    }
}
