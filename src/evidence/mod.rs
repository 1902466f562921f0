//! Evidence chunk model and paper-id normalization.

pub mod ids;
pub mod model;


pub use ids::{normalize_paper_id, normalized_set};
pub use model::{ChunkKey, EvidenceChunk};

use std::collections::HashSet;

/// Number of distinct non-empty paper ids among `evidence`.
pub fn distinct_papers(evidence: &[EvidenceChunk]) -> usize {
    evidence
        .iter()
        .map(|chunk| chunk.paper_id.as_str())
        .filter(|id| !id.is_empty())
        .collect::<HashSet<_>>()
        .len()
}
