use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::llm::LlmError;
use crate::retrieval::RetrievalError;

/// Failures that prevent the orchestrator from reaching any verdict.
///
/// Refusals are not errors: they come back as a refused
/// [`FinalAnswer`](super::FinalAnswer).
#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("hydration task failed: {reason}")]
    Hydration { reason: String },

    #[error("invalid orchestrator configuration: {reason}")]
    InvalidConfig { reason: String },
}
