//! Reciprocal Rank Fusion (RRF).
//!
//! Each input ranking contributes `1 / (k + rank + 1)` (0-based `rank`) to the running
//! score of every `(paper_id, chunk_id)` it contains. Items absent from a ranking get
//! nothing from it. Larger `k` flattens the difference between adjacent ranks.
//!
//! For `k = 60` and three rankings, an item present in all three at rank `r` beats an
//! item that is rank 0 in only one of them whenever `3 / (61 + r) > 1 / 61`, i.e. for
//! every `r <= 121`.


use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::evidence::ChunkKey;

pub use crate::constants::DEFAULT_RRF_K;

/// One entry of a fused ranking. Scores are only comparable within one fusion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedHit {
    pub paper_id: String,
    pub chunk_id: String,
    pub score: f64,
}

impl FusedHit {
    pub fn key(&self) -> ChunkKey {
        ChunkKey::new(&self.paper_id, &self.chunk_id)
    }
}

/// Contribution of a single rank position.
#[inline]
pub fn reciprocal_rank(rank: usize, k: usize) -> f64 {
    1.0 / (k as f64 + rank as f64 + 1.0)
}

/// Fuses any number of rankings into one, best first.
///
/// Ties keep first-seen order: rankings are scanned in input order, items within a
/// ranking in rank order, and the sort is stable.
pub fn fuse<R: AsRef<[ChunkKey]>>(rankings: &[R], k: usize) -> Vec<FusedHit> {
    let mut positions: HashMap<ChunkKey, usize> = HashMap::new();
    let mut fused: Vec<FusedHit> = Vec::new();

    for ranking in rankings {
        for (rank, key) in ranking.as_ref().iter().enumerate() {
            let contribution = reciprocal_rank(rank, k);
            match positions.entry(key.clone()) {
                Entry::Occupied(slot) => fused[*slot.get()].score += contribution,
                Entry::Vacant(slot) => {
                    slot.insert(fused.len());
                    fused.push(FusedHit {
                        paper_id: key.paper_id.clone(),
                        chunk_id: key.chunk_id.clone(),
                        score: contribution,
                    });
                }
            }
        }
    }

    fused.sort_by(|a, b| b.score.total_cmp(&a.score));

    debug!(
        rankings = rankings.len(),
        fused = fused.len(),
        k = k,
        top_score = fused.first().map(|h| h.score),
        "Reciprocal rank fusion complete"
    );

    fused
}
