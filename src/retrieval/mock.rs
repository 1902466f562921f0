use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{Hydrator, RetrievalError, Retriever};
use crate::evidence::{ChunkKey, EvidenceChunk};

/// Retriever returning a fixed ranking and counting calls.
#[derive(Debug, Default)]
pub struct MockRetriever {
    name: String,
    results: Vec<EvidenceChunk>,
    unavailable: bool,
    calls: AtomicUsize,
}

impl MockRetriever {
    pub fn new(results: Vec<EvidenceChunk>) -> Self {
        Self {
            name: "mock".to_string(),
            results,
            unavailable: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every search fails with [`RetrievalError::Unavailable`].
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new(vec![])
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    async fn search(&self, _query: &str) -> Result<Vec<EvidenceChunk>, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(RetrievalError::Unavailable {
                url: "mock://retriever".to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(self.results.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Hydrator backed by an in-memory `(paper_id, chunk_id) -> text` map.
///
/// Chunks missing from the map keep whatever text they already had.
#[derive(Debug, Default)]
pub struct MockHydrator {
    texts: HashMap<ChunkKey, String>,
    calls: AtomicUsize,
}

impl MockHydrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, paper_id: &str, chunk_id: &str, text: impl Into<String>) -> Self {
        self.texts.insert(ChunkKey::new(paper_id, chunk_id), text.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Hydrator for MockHydrator {
    fn attach_text(
        &self,
        mut chunks: Vec<EvidenceChunk>,
    ) -> Result<Vec<EvidenceChunk>, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for chunk in &mut chunks {
            if let Some(text) = self.texts.get(&chunk.key()) {
                chunk.text = Some(text.clone());
            }
        }
        Ok(chunks)
    }
}
