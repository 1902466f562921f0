use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by retrievers and hydrators.
pub enum RetrievalError {
    /// The retrieval service did not answer within the configured timeout.
    #[error("retrieval request to '{url}' timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    /// Connection refused, DNS failure or a non-success status.
    #[error("retriever at '{url}' unavailable: {message}")]
    Unavailable { url: String, message: String },

    #[error("invalid retrieval response: {reason}")]
    InvalidResponse { reason: String },

    /// A chunk file exists but could not be read or parsed.
    #[error("chunk store error at '{path}': {reason}")]
    Store { path: String, reason: String },

    #[error("invalid retriever configuration: {reason}")]
    InvalidConfig { reason: String },
}
