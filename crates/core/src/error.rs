#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Free generation limit of {limit} reached; sign in to continue")]
    UsageLimitReached { limit: u64 },
}
