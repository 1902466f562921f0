use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A citation marker whose index does not refer to any evidence chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutOfBoundsCitation {
    /// 1-based sentence position.
    pub sentence: usize,
    /// The index as written (kept as text so overflowing numbers are still reported).
    pub index: String,
}

/// Outcome of citation syntax checking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxResult {
    pub verification_passed: bool,
    pub errors: Vec<String>,
    /// In-range 1-based evidence indices cited anywhere in the answer.
    pub cited_indices: BTreeSet<usize>,
    pub out_of_bounds: Vec<OutOfBoundsCitation>,
    pub sentence_count: usize,
}

impl SyntaxResult {
    /// True when the answer had no sentences at all.
    pub fn is_empty_input(&self) -> bool {
        self.sentence_count == 0
    }

    pub fn has_citations(&self) -> bool {
        !self.cited_indices.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Supported,
    Unsupported,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Supported => "supported",
            VerificationStatus::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One answer sentence annotated with its best-matching evidence chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceDetail {
    pub text: String,
    pub max_score: f32,
    /// 0-based evidence position; `None` when below threshold.
    pub supported_by_chunk_index: Option<usize>,
    pub verification_status: VerificationStatus,
}

impl SentenceDetail {
    pub fn is_supported(&self) -> bool {
        self.verification_status == VerificationStatus::Supported
    }
}

/// Outcome of semantic attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionResult {
    pub attribution_passed: bool,
    pub details: Vec<SentenceDetail>,
    pub failures: Vec<String>,
}

impl AttributionResult {
    pub(crate) fn empty_input() -> Self {
        Self {
            attribution_passed: false,
            details: vec![],
            failures: vec!["Empty input".to_string()],
        }
    }

    pub fn supported_count(&self) -> usize {
        self.details.iter().filter(|d| d.is_supported()).count()
    }
}
