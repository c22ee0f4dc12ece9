use reqwest::StatusCode;

/// All remote failures are caught at the operation boundary and turned
/// into one of these; nothing propagates as a panic.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("remote fetch returned status {0}")]
    RemoteStatus(StatusCode),

    #[error("remote update failed with status {0}")]
    RemoteUpdate(StatusCode),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unsupported remote operation: {0}")]
    Unsupported(&'static str),
}

impl ApiError {
    /// Failed writes can be parked in the outbox and retried; failed
    /// reads and validation errors cannot.
    pub fn is_retryable_write(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::RemoteUpdate(_) | ApiError::RemoteStatus(_))
    }
}
