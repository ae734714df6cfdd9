//! Error taxonomy of the generation job lifecycle.

use std::time::Duration;

use plates_core::error::CoreError;

use crate::provider::ProviderError;

/// Every way a submit-and-poll flow can end without an asset URL.
///
/// Callers are expected to show a generic retry prompt for all variants;
/// the variants exist so they can be told apart in logs and tests.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The request was rejected before any network call was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The provider could not be reached or replied with an error status.
    #[error("Transport error: {0}")]
    Transport(#[from] ProviderError),

    /// The job reached the `failed` state.
    #[error("Image generation failed: {0}")]
    ProviderJobFailed(String),

    /// The provider reported success but the response is unusable.
    #[error("Malformed provider result: {0}")]
    MalformedResult(String),

    /// The poll loop exhausted its attempt or wall-clock budget.
    #[error("Timed out after {attempts} status checks ({elapsed:?})")]
    Timeout { attempts: u32, elapsed: Duration },

    /// The caller's cancellation token fired.
    #[error("Generation cancelled")]
    Cancelled,
}

impl From<CoreError> for GenerationError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::InvalidInput(msg),
            other => Self::InvalidInput(other.to_string()),
        }
    }
}
