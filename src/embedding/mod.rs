//! Text embedding for sentence/evidence attribution.
//!
//! The [`Embedder`] trait is the seam to the embedding model; the same model must back
//! retrieval and attribution so similarities live in one space.
//!
//! - [`OllamaEmbedder`] calls an Ollama-compatible `/api/embed` endpoint.
//! - [`HashingEmbedder`] is a deterministic, model-free fallback (feature hashing).
//! - [`CachedEmbedder`] memoizes any embedder; evidence is re-embedded on every
//!   generation attempt otherwise.

mod cached;
mod error;
mod hashing;
mod ollama;
mod similarity;


pub use cached::CachedEmbedder;
pub use error::EmbeddingError;
pub use hashing::HashingEmbedder;
pub use ollama::{DEFAULT_EMBED_MODEL, OllamaEmbedder, OllamaEmbedderConfig};
pub use similarity::{cosine_similarity, normalize_in_place};

use std::sync::Arc;

use async_trait::async_trait;

#[async_trait]
/// Batch text encoder. Implementations must be safe for concurrent read-only use.
pub trait Embedder: Send + Sync {
    /// Encodes `texts` into one vector each, in input order.
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Model identifier (used to key caches).
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<E: Embedder + ?Sized> Embedder for Arc<E> {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).encode(texts).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
