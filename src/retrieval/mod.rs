//! Evidence retrieval collaborators.
//!
//! A [`Retriever`] returns a ranked list of [`EvidenceChunk`]s, usually without text.
//! A [`Hydrator`] fills in the text from the chunk store.

mod error;
pub mod http;
pub mod hybrid;
pub mod store;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use error::RetrievalError;
pub use http::{HttpRetriever, HttpRetrieverConfig};
pub use hybrid::HybridRetriever;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockHydrator, MockRetriever};
pub use store::JsonChunkStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::evidence::EvidenceChunk;

#[async_trait]
/// Ranked evidence search, best first.
pub trait Retriever: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<EvidenceChunk>, RetrievalError>;

    /// Short label used in logs.
    fn name(&self) -> &str;
}

#[async_trait]
impl<R: Retriever + ?Sized> Retriever for Arc<R> {
    async fn search(&self, query: &str) -> Result<Vec<EvidenceChunk>, RetrievalError> {
        (**self).search(query).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Attaches chunk text keyed by `(paper_id, section, chunk_id)`.
///
/// Chunks that cannot be found keep `text = None`; only an unreadable store is an error.
pub trait Hydrator: Send + Sync {
    fn attach_text(&self, chunks: Vec<EvidenceChunk>) -> Result<Vec<EvidenceChunk>, RetrievalError>;
}

/// Hydrator for retrievers that already return chunk text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughHydrator;

impl Hydrator for PassthroughHydrator {
    fn attach_text(&self, chunks: Vec<EvidenceChunk>) -> Result<Vec<EvidenceChunk>, RetrievalError> {
        Ok(chunks)
    }
}
