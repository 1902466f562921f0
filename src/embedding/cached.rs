use std::sync::Arc;

use async_trait::async_trait;
use moka::sync::Cache;
use tracing::debug;

use super::error::EmbeddingError;
use super::Embedder;
use crate::constants::DEFAULT_EMBEDDING_CACHE_CAPACITY;
use crate::hashing::embedding_cache_key;

/// Memoizing wrapper keyed by a BLAKE3 hash of `(model, text)`.
///
/// Only cache misses are forwarded to the inner embedder, in one batch.
pub struct CachedEmbedder<E> {
    inner: E,
    entries: Cache<[u8; 32], Arc<Vec<f32>>>,
}

impl<E: Embedder> std::fmt::Debug for CachedEmbedder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedEmbedder")
            .field("model", &self.inner.model_name())
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl<E: Embedder> CachedEmbedder<E> {
    pub fn new(inner: E) -> Self {
        Self::with_capacity(inner, DEFAULT_EMBEDDING_CACHE_CAPACITY)
    }

    pub fn with_capacity(inner: E, capacity: u64) -> Self {
        Self {
            inner,
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Approximate number of cached vectors.
    pub fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }
}

#[async_trait]
impl<E: Embedder> Embedder for CachedEmbedder<E> {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let model = self.inner.model_name();
        let keys: Vec<[u8; 32]> = texts
            .iter()
            .map(|t| embedding_cache_key(model, t))
            .collect();

        let mut out: Vec<Option<Arc<Vec<f32>>>> =
            keys.iter().map(|k| self.entries.get(k)).collect();

        let missing: Vec<usize> = out
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.is_none().then_some(i))
            .collect();

        debug!(
            total = texts.len(),
            misses = missing.len(),
            "Embedding cache lookup"
        );

        if !missing.is_empty() {
            let batch: Vec<String> = missing.iter().map(|&i| texts[i].clone()).collect();
            let fresh = self.inner.encode(&batch).await?;
            if fresh.len() != batch.len() {
                return Err(EmbeddingError::CountMismatch {
                    expected: batch.len(),
                    actual: fresh.len(),
                });
            }

            for (&i, vector) in missing.iter().zip(fresh) {
                let vector = Arc::new(vector);
                self.entries.insert(keys[i], Arc::clone(&vector));
                out[i] = Some(vector);
            }
        }

        Ok(out
            .into_iter()
            .map(|v| v.map(|v| v.as_ref().clone()).unwrap_or_default())
            .collect())
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
