//! Status polling.
//!
//! [`JobPoller::poll_until_done`] queries a prediction's status strictly
//! sequentially, sleeping a fixed interval between queries, until the job
//! is terminal, the attempt or wall-clock budget runs out, or the caller's
//! [`CancellationToken`] fires.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::PollConfig;
use crate::error::GenerationError;
use crate::prediction::{parse_prediction, JobHandle, JobStatus, Prediction};
use crate::provider::{PredictionProvider, ProviderError};

/// Longest an abandoned poll waits for the provider to accept a cancel.
pub const REMOTE_CANCEL_TIMEOUT: Duration = Duration::from_secs(5);

/// Polls a prediction provider until a job finishes.
pub struct JobPoller<P> {
    provider: Arc<P>,
    config: PollConfig,
}

impl<P: PredictionProvider> JobPoller<P> {
    pub fn new(provider: Arc<P>, config: PollConfig) -> Self {
        Self { provider, config }
    }

    /// Poll `handle` until it succeeds, fails, times out or is cancelled.
    ///
    /// Returns the first output URL of a succeeded job. The first query is
    /// issued immediately; later ones follow `config.interval` after the
    /// previous reply. A transport failure ends the loop at once unless
    /// `config.transport_retry` allows retries.
    pub async fn poll_until_done(
        &self,
        handle: &JobHandle,
        cancel: &CancellationToken,
    ) -> Result<String, GenerationError> {
        let started = Instant::now();
        let deadline = self.config.timeout.map(|t| started + t);
        let mut attempt = 0u32;

        loop {
            if cancel.is_cancelled() {
                return self.abort(handle, GenerationError::Cancelled).await;
            }
            let budget_spent = self.config.max_attempts.is_some_and(|max| attempt >= max)
                || deadline.is_some_and(|d| Instant::now() >= d);
            if budget_spent {
                return self.timeout(handle, attempt, started).await;
            }

            attempt += 1;

            let query = self.fetch_status(&handle.id);
            let raw = tokio::select! {
                _ = cancel.cancelled() => {
                    return self.abort(handle, GenerationError::Cancelled).await;
                }
                result = until(deadline, query) => match result {
                    Some(raw) => raw?,
                    None => return self.timeout(handle, attempt, started).await,
                },
            };

            let prediction = parse_prediction(raw).map_err(|e| {
                GenerationError::MalformedResult(format!("unreadable status response: {e}"))
            })?;

            tracing::info!(
                prediction_id = %handle.id,
                attempt,
                status = %prediction.status,
                "Polled prediction status",
            );

            if let Some(outcome) = resolve(&handle.id, &prediction) {
                return outcome;
            }
            if self.config.max_attempts.is_some_and(|max| attempt >= max) {
                return self.timeout(handle, attempt, started).await;
            }

            let pause = match deadline {
                Some(d) => self
                    .config
                    .interval
                    .min(d.saturating_duration_since(Instant::now())),
                None => self.config.interval,
            };
            tokio::select! {
                _ = cancel.cancelled() => {
                    return self.abort(handle, GenerationError::Cancelled).await;
                }
                _ = tokio::time::sleep(pause) => {}
            }
        }
    }

    // ---- private helpers ----

    /// One status query, re-sent after each pause the retry policy yields.
    async fn fetch_status(&self, id: &str) -> Result<serde_json::Value, ProviderError> {
        let mut delays = self.config.transport_retry.delays();
        let mut retry = 0u32;

        loop {
            let err = match self.provider.get_prediction(id).await {
                Ok(raw) => return Ok(raw),
                Err(e) => e,
            };
            let Some(delay) = delays.next() else {
                tracing::error!(prediction_id = %id, error = %err, "Status query failed");
                return Err(err);
            };
            retry += 1;
            tracing::warn!(
                prediction_id = %id,
                error = %err,
                retry,
                delay_ms = delay.as_millis() as u64,
                "Status query failed, retrying",
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn timeout(
        &self,
        handle: &JobHandle,
        attempts: u32,
        started: Instant,
    ) -> Result<String, GenerationError> {
        let err = GenerationError::Timeout {
            attempts,
            elapsed: started.elapsed(),
        };
        self.abort(handle, err).await
    }

    /// Stop waiting on `handle`, optionally asking the provider to cancel it.
    async fn abort(
        &self,
        handle: &JobHandle,
        err: GenerationError,
    ) -> Result<String, GenerationError> {
        tracing::warn!(prediction_id = %handle.id, reason = %err, "Abandoning prediction");

        if self.config.cancel_remote_on_abort {
            let cancel_call = self.provider.cancel_prediction(&handle.id);
            match tokio::time::timeout(REMOTE_CANCEL_TIMEOUT, cancel_call).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!(
                    prediction_id = %handle.id,
                    error = %e,
                    "Failed to cancel prediction on provider",
                ),
                Err(_) => tracing::warn!(
                    prediction_id = %handle.id,
                    timeout_ms = REMOTE_CANCEL_TIMEOUT.as_millis() as u64,
                    "Provider did not acknowledge cancellation in time",
                ),
            }
        }
        Err(err)
    }
}

/// Map a terminal prediction to the loop's outcome; `None` keeps polling.
fn resolve(id: &str, prediction: &Prediction) -> Option<Result<String, GenerationError>> {
    match prediction.status {
        JobStatus::Succeeded => Some(match prediction.first_output() {
            Some(url) => {
                tracing::info!(
                    prediction_id = %id,
                    url = %url,
                    provider_duration_ms = prediction.provider_duration_ms(),
                    "Prediction succeeded",
                );
                Ok(url.to_string())
            }
            None => Err(GenerationError::MalformedResult(format!(
                "prediction {id} succeeded without output"
            ))),
        }),
        JobStatus::Failed => {
            let detail = prediction
                .error_message()
                .unwrap_or_else(|| "provider reported failure".to_string());
            tracing::error!(prediction_id = %id, error = %detail, "Prediction failed");
            Some(Err(GenerationError::ProviderJobFailed(detail)))
        }
        JobStatus::Queued | JobStatus::Processing | JobStatus::Unknown(_) => None,
    }
}

/// Run `fut` to completion, or return `None` once `deadline` passes.
async fn until<F: std::future::Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(d) => tokio::time::timeout_at(d, fut).await.ok(),
        None => Some(fut.await),
    }
}
