use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use tracing::debug;

use super::error::EmbeddingError;
use super::similarity::normalize_in_place;
use super::Embedder;
use crate::constants::HASHING_EMBEDDING_DIM;
use crate::hashing::hash_to_u64;

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has",
        "had", "do", "does", "did", "will", "would", "could", "should", "may", "might", "must",
        "can", "to", "of", "in", "for", "on", "with", "at", "by", "from", "as", "into",
        "through", "during", "before", "after", "than", "too", "very", "and", "but", "if",
        "or", "because", "while", "what", "which", "who", "this", "that", "these", "those",
        "it", "its",
    ]
    .into_iter()
    .collect()
});

/// Deterministic bag-of-words embedder.
///
/// Each non-stop-word token is hashed into one of `dim` buckets and the counts are
/// unit-normalized. Identical texts embed identically (cosine 1.0), texts without a
/// shared content word score 0.0. Lexical only: paraphrases do not match.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dim: HASHING_EMBEDDING_DIM,
        }
    }
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Result<Self, EmbeddingError> {
        if dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding dimension must be non-zero".to_string(),
            });
        }
        Ok(Self { dim })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Embeds a single string.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        let lowered = text.to_lowercase();

        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        {
            let bucket = (hash_to_u64(token.as_bytes()) % self.dim as u64) as usize;
            vector[bucket] += 1.0;
        }

        normalize_in_place(&mut vector);
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        debug!(count = texts.len(), dim = self.dim, "Hashing embeddings");
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    fn model_name(&self) -> &str {
        "hashing"
    }
}
