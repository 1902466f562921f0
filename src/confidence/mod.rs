//! Composite trust score for a verified answer.
//!
//! `confidence = w_a * alignment + w_r * recall + w_p * precision`, clamped to `[0, 1]`.
//!
//! - **alignment**: fraction of sentences marked supported.
//! - **recall**: 1.0 when any of the first `recall_k` retrieved papers is relevant.
//! - **precision**: fraction of distinct supporting chunks whose paper is relevant.
//!
//! Paper ids are compared through [`normalize_paper_id`](crate::evidence::normalize_paper_id).
//! Without a relevant-paper set, recall is 0.0 and precision is 1.0.

mod config;


pub use config::{ConfidenceConfig, ConfidenceWeights};

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::evidence::{EvidenceChunk, normalize_paper_id, normalized_set};
use crate::verify::SentenceDetail;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfidenceResult {
    pub confidence_score: f32,
    pub alignment_score: f32,
    pub recall_score: f32,
    pub citation_precision: f32,
}

#[derive(Debug, Clone, Default)]
pub struct ConfidenceScorer {
    config: ConfidenceConfig,
}

impl ConfidenceScorer {
    pub fn new(config: ConfidenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConfidenceConfig {
        &self.config
    }

    /// Scores one attempt.
    ///
    /// `evidence` resolves `supported_by_chunk_index` to a paper id. `relevant_papers`
    /// is the gold set, when known; an empty slice counts as unknown.
    pub fn score(
        &self,
        details: &[SentenceDetail],
        evidence: &[EvidenceChunk],
        retrieved_ids: &[String],
        relevant_papers: Option<&[String]>,
    ) -> ConfidenceResult {
        if details.is_empty() {
            return ConfidenceResult::default();
        }

        let relevant = relevant_papers
            .map(normalized_set)
            .filter(|set| !set.is_empty());

        let alignment_score = alignment_score(details);
        let recall_score = relevant
            .as_ref()
            .map_or(0.0, |set| recall_hit(retrieved_ids, set, self.config.recall_k));
        let citation_precision = relevant
            .as_ref()
            .map_or(1.0, |set| citation_precision(details, evidence, set));

        let weights = &self.config.weights;
        let confidence_score = (weights.alignment.clamp(0.0, 1.0) * alignment_score
            + weights.recall.clamp(0.0, 1.0) * recall_score
            + weights.precision.clamp(0.0, 1.0) * citation_precision)
            .clamp(0.0, 1.0);

        debug!(
            confidence = confidence_score,
            alignment = alignment_score,
            recall = recall_score,
            precision = citation_precision,
            "Confidence scored"
        );

        ConfidenceResult {
            confidence_score,
            alignment_score,
            recall_score,
            citation_precision,
        }
    }
}

fn alignment_score(details: &[SentenceDetail]) -> f32 {
    let supported = details.iter().filter(|d| d.is_supported()).count();
    supported as f32 / details.len() as f32
}

fn recall_hit(retrieved_ids: &[String], relevant: &HashSet<String>, k: usize) -> f32 {
    let hit = retrieved_ids
        .iter()
        .take(k)
        .any(|id| relevant.contains(&normalize_paper_id(id)));
    if hit { 1.0 } else { 0.0 }
}

fn citation_precision(
    details: &[SentenceDetail],
    evidence: &[EvidenceChunk],
    relevant: &HashSet<String>,
) -> f32 {
    let used: BTreeSet<usize> = details
        .iter()
        .filter_map(|d| d.supported_by_chunk_index)
        .filter(|&idx| idx < evidence.len())
        .collect();

    if used.is_empty() {
        return 0.0;
    }

    let relevant_hits = used
        .iter()
        .filter(|&&idx| relevant.contains(&normalize_paper_id(&evidence[idx].paper_id)))
        .count();
    relevant_hits as f32 / used.len() as f32
}
