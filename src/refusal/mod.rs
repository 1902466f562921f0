//! Ordered refusal guards.
//!
//! [`RefusalPolicy::decide`] walks its guards in a fixed order and stops at the first
//! match. Evidence presence and source diversity come first; the semantic checks that
//! follow are meaningless without evidence.


use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::{
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_MIN_DISTINCT_PAPERS, DEFAULT_PRECISION_THRESHOLD,
};
use crate::evidence::{EvidenceChunk, distinct_papers};
use crate::verify::SentenceDetail;

/// Why an answer was withheld. The `Display` text is part of the public contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RefusalReason {
    NoEvidence,
    InsufficientDiversity { found: usize, required: usize },
    NoAlignedSentences,
    /// `index` is 0-based.
    UnsupportedSentence { index: usize },
    LowConfidence { score: f32, threshold: f32 },
    LowCitationPrecision { precision: f32, threshold: f32 },
    /// Too little evidence survived retrieval to attempt generation.
    InsufficientInformation,
    /// No compliant answer within the attempt budget.
    MaxRetriesFailed,
}

impl std::fmt::Display for RefusalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefusalReason::NoEvidence => f.write_str("No evidence retrieved"),
            RefusalReason::InsufficientDiversity { found, required } => {
                write!(f, "Insufficient source diversity ({found} < {required})")
            }
            RefusalReason::NoAlignedSentences => f.write_str("No valid sentences aligned"),
            RefusalReason::UnsupportedSentence { index } => {
                write!(f, "Unsupported sentence at index {index}")
            }
            RefusalReason::LowConfidence { score, threshold } => {
                write!(f, "Low Confidence ({score:.4} < {threshold:.4})")
            }
            RefusalReason::LowCitationPrecision {
                precision,
                threshold,
            } => write!(f, "Low Citation Precision ({precision:.4} < {threshold:.4})"),
            RefusalReason::InsufficientInformation => f.write_str("Insufficient Information"),
            RefusalReason::MaxRetriesFailed => f.write_str("Max Retries Failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefusalDecision {
    pub refuse: bool,
    pub reason: Option<RefusalReason>,
}

impl RefusalDecision {
    pub fn pass() -> Self {
        Self {
            refuse: false,
            reason: None,
        }
    }

    pub fn refuse(reason: RefusalReason) -> Self {
        Self {
            refuse: true,
            reason: Some(reason),
        }
    }

    /// Reason text, `"Pass"` when not refused.
    pub fn reason_text(&self) -> String {
        self.reason
            .as_ref()
            .map_or_else(|| "Pass".to_string(), ToString::to_string)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefusalPolicy {
    pub confidence_threshold: f32,
    pub precision_threshold: f32,
    pub min_distinct_papers: usize,
}

impl Default for RefusalPolicy {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            precision_threshold: DEFAULT_PRECISION_THRESHOLD,
            min_distinct_papers: DEFAULT_MIN_DISTINCT_PAPERS,
        }
    }
}

impl RefusalPolicy {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "confidence threshold must be between 0.0 and 1.0, got {}",
                self.confidence_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.precision_threshold) {
            return Err(format!(
                "precision threshold must be between 0.0 and 1.0, got {}",
                self.precision_threshold
            ));
        }
        Ok(())
    }

    /// Runs the guard chain. First match wins.
    pub fn decide(
        &self,
        evidence: &[EvidenceChunk],
        details: &[SentenceDetail],
        confidence_score: f32,
        citation_precision: f32,
    ) -> RefusalDecision {
        let decision = self
            .first_violation(evidence, details, confidence_score, citation_precision)
            .map_or_else(RefusalDecision::pass, RefusalDecision::refuse);

        if decision.refuse {
            info!(reason = %decision.reason_text(), "Refusal triggered");
        } else {
            debug!(
                confidence = confidence_score,
                precision = citation_precision,
                "Refusal policy passed"
            );
        }
        decision
    }

    fn first_violation(
        &self,
        evidence: &[EvidenceChunk],
        details: &[SentenceDetail],
        confidence_score: f32,
        citation_precision: f32,
    ) -> Option<RefusalReason> {
        if evidence.is_empty() {
            return Some(RefusalReason::NoEvidence);
        }

        let found = distinct_papers(evidence);
        if found < self.min_distinct_papers {
            return Some(RefusalReason::InsufficientDiversity {
                found,
                required: self.min_distinct_papers,
            });
        }

        if details.is_empty() {
            return Some(RefusalReason::NoAlignedSentences);
        }

        if let Some(index) = details.iter().position(|d| !d.is_supported()) {
            return Some(RefusalReason::UnsupportedSentence { index });
        }

        if confidence_score < self.confidence_threshold {
            return Some(RefusalReason::LowConfidence {
                score: confidence_score,
                threshold: self.confidence_threshold,
            });
        }

        if citation_precision < self.precision_threshold {
            return Some(RefusalReason::LowCitationPrecision {
                precision: citation_precision,
                threshold: self.precision_threshold,
            });
        }

        None
    }
}
