use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{RetrievalError, Retriever};
use crate::evidence::{ChunkKey, EvidenceChunk};
use crate::fusion::fuse;

/// Fuses several retrievers into one ranking with reciprocal rank fusion.
///
/// Chunk metadata comes from the first retriever that returned the chunk. `score` is
/// replaced by the fused score.
pub struct HybridRetriever {
    retrievers: Vec<Arc<dyn Retriever>>,
    rrf_k: usize,
    top_k: usize,
}

impl HybridRetriever {
    pub fn new(
        retrievers: Vec<Arc<dyn Retriever>>,
        rrf_k: usize,
        top_k: usize,
    ) -> Result<Self, RetrievalError> {
        if retrievers.is_empty() {
            return Err(RetrievalError::InvalidConfig {
                reason: "hybrid retrieval needs at least one retriever".to_string(),
            });
        }
        if rrf_k == 0 || top_k == 0 {
            return Err(RetrievalError::InvalidConfig {
                reason: format!("rrf_k and top_k must be positive (rrf_k={rrf_k}, top_k={top_k})"),
            });
        }

        Ok(Self {
            retrievers,
            rrf_k,
            top_k,
        })
    }

    pub fn len(&self) -> usize {
        self.retrievers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retrievers.is_empty()
    }
}

#[async_trait]
impl Retriever for HybridRetriever {
    async fn search(&self, query: &str) -> Result<Vec<EvidenceChunk>, RetrievalError> {
        let mut rankings: Vec<Vec<ChunkKey>> = Vec::with_capacity(self.retrievers.len());
        let mut first_seen: HashMap<ChunkKey, EvidenceChunk> = HashMap::new();

        for retriever in &self.retrievers {
            let start = Instant::now();
            let results = retriever.search(query).await?;
            debug!(
                retriever = retriever.name(),
                results = results.len(),
                latency_ms = start.elapsed().as_millis() as u64,
                "Retriever returned"
            );

            let mut ranking = Vec::with_capacity(results.len());
            for chunk in results {
                let key = chunk.key();
                ranking.push(key.clone());
                match first_seen.entry(key) {
                    Entry::Vacant(slot) => {
                        slot.insert(chunk);
                    }
                    Entry::Occupied(mut slot) => {
                        let kept = slot.get_mut();
                        if kept.text.is_none() {
                            kept.text = chunk.text;
                        }
                    }
                }
            }
            rankings.push(ranking);
        }

        let fused: Vec<EvidenceChunk> = fuse(&rankings, self.rrf_k)
            .into_iter()
            .take(self.top_k)
            .filter_map(|hit| {
                first_seen.remove(&hit.key()).map(|chunk| EvidenceChunk {
                    score: hit.score as f32,
                    ..chunk
                })
            })
            .collect();

        info!(
            retrievers = self.retrievers.len(),
            unique = first_seen.len() + fused.len(),
            returned = fused.len(),
            "Hybrid retrieval fused"
        );

        Ok(fused)
    }

    fn name(&self) -> &str {
        "hybrid"
    }
}
