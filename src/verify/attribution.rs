use std::sync::Arc;

use tracing::{debug, info};

use super::config::AttributionConfig;
use super::types::{AttributionResult, SentenceDetail, VerificationStatus};
use crate::embedding::{Embedder, EmbeddingError, cosine_similarity};
use crate::evidence::EvidenceChunk;

/// Marks each sentence supported or unsupported by its best-matching evidence chunk.
///
/// The embedder is shared with retrieval so that similarities are computed in the same
/// space the evidence was ranked in.
pub struct Attributor {
    embedder: Arc<dyn Embedder>,
    config: AttributionConfig,
}

impl Attributor {
    pub fn new(embedder: Arc<dyn Embedder>, config: AttributionConfig) -> Self {
        Self { embedder, config }
    }

    pub fn config(&self) -> &AttributionConfig {
        &self.config
    }

    /// Embeds `sentences` and the text of `evidence`, then applies [`attribute`].
    ///
    /// Empty sentences or empty evidence fail immediately without calling the embedder.
    pub async fn verify(
        &self,
        sentences: &[String],
        evidence: &[EvidenceChunk],
    ) -> Result<AttributionResult, EmbeddingError> {
        if sentences.is_empty() || evidence.is_empty() {
            debug!(
                sentences = sentences.len(),
                evidence = evidence.len(),
                "Attribution skipped on empty input"
            );
            return Ok(AttributionResult::empty_input());
        }

        let evidence_texts: Vec<String> = evidence
            .iter()
            .map(|chunk| chunk.text_or_empty().to_string())
            .collect();

        let sentence_vecs = self.embedder.encode(sentences).await?;
        let evidence_vecs = self.embedder.encode(&evidence_texts).await?;

        check_count(sentences.len(), sentence_vecs.len())?;
        check_count(evidence_texts.len(), evidence_vecs.len())?;

        let result = attribute(sentences, &sentence_vecs, &evidence_vecs, self.config.threshold);

        info!(
            sentences = sentences.len(),
            supported = result.supported_count(),
            passed = result.attribution_passed,
            threshold = self.config.threshold,
            "Attribution complete"
        );

        Ok(result)
    }
}

fn check_count(expected: usize, actual: usize) -> Result<(), EmbeddingError> {
    if expected != actual {
        return Err(EmbeddingError::CountMismatch { expected, actual });
    }
    Ok(())
}

/// Thresholds precomputed embeddings.
///
/// `sentence_vecs[i]` must belong to `sentences[i]`. On equal scores the earliest
/// evidence chunk wins. A NaN similarity never counts as support.
pub fn attribute(
    sentences: &[String],
    sentence_vecs: &[Vec<f32>],
    evidence_vecs: &[Vec<f32>],
    threshold: f32,
) -> AttributionResult {
    if sentences.is_empty() || evidence_vecs.is_empty() {
        return AttributionResult::empty_input();
    }

    let mut details = Vec::with_capacity(sentences.len());
    let mut failures = Vec::new();

    for (i, (sentence, sentence_vec)) in sentences.iter().zip(sentence_vecs).enumerate() {
        let (best_idx, max_score) = best_match(sentence_vec, evidence_vecs);
        let supported = max_score >= threshold;

        if !supported {
            failures.push(format!(
                "Sentence {} unsupported (max score {:.2} < {})",
                i + 1,
                max_score,
                threshold
            ));
        }

        details.push(SentenceDetail {
            text: sentence.clone(),
            max_score,
            supported_by_chunk_index: supported.then_some(best_idx),
            verification_status: if supported {
                VerificationStatus::Supported
            } else {
                VerificationStatus::Unsupported
            },
        });
    }

    AttributionResult {
        attribution_passed: failures.is_empty() && details.len() == sentences.len(),
        details,
        failures,
    }
}

fn best_match(sentence_vec: &[f32], evidence_vecs: &[Vec<f32>]) -> (usize, f32) {
    let mut best = (0, f32::NEG_INFINITY);
    for (idx, evidence_vec) in evidence_vecs.iter().enumerate() {
        let score = cosine_similarity(sentence_vec, evidence_vec);
        if score > best.1 {
            best = (idx, score);
        }
    }
    best
}
