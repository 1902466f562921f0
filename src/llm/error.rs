use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    /// The model did not finish within the configured timeout.
    #[error("generation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The model answered with no usable text.
    #[error("generation returned an empty response")]
    EmptyResponse,

    /// The provider answered but the call failed in a way worth retrying
    /// (rate limit, server error, unparsable reply).
    #[error("generator '{model}' failed: {message}")]
    Provider { model: String, message: String },

    /// Provider unreachable, unauthorized or misconfigured.
    #[error("generator '{model}' unavailable: {message}")]
    Unavailable { model: String, message: String },
}

impl LlmError {
    /// Timeouts, empty output and retryable provider failures are retried like any
    /// other malformed response.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::Timeout { .. } | LlmError::EmptyResponse | LlmError::Provider { .. }
        )
    }
}
