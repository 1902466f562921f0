use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::confidence::ConfidenceResult;
use crate::constants::REFUSAL_MESSAGE;
use crate::evidence::EvidenceChunk;
use crate::refusal::RefusalReason;
use crate::verify::SentenceDetail;

/// Orchestrator state, as reported in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerPhase {
    Retrieving,
    Prompting,
    Generating,
    Verifying,
    Retry,
    Success,
    Refused,
}

impl AnswerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerPhase::Retrieving => "retrieving",
            AnswerPhase::Prompting => "prompting",
            AnswerPhase::Generating => "generating",
            AnswerPhase::Verifying => "verifying",
            AnswerPhase::Retry => "retry",
            AnswerPhase::Success => "success",
            AnswerPhase::Refused => "refused",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AnswerPhase::Success | AnswerPhase::Refused)
    }
}

impl std::fmt::Display for AnswerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cited evidence chunk in the final answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Sequential, 1-based, in first-seen order within the answer.
    pub citation_id: usize,
    /// 1-based position in the evidence list (the `[n]` in the answer).
    pub evidence_index: usize,
    pub paper_id: String,
    pub section: String,
    pub chunk_id: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnswerMetrics {
    pub retrieval_latency_ms: u64,
    /// Summed over all generation attempts.
    pub llm_latency_ms: u64,
    /// Hydrated evidence chunks handed to the generator.
    pub retrieved_chunks: usize,
    pub attempts: usize,
    /// Sentences kept after truncation.
    pub total_sentences: usize,
    /// Sentences dropped by truncation.
    pub unaligned_sentences: usize,
    pub truncated: bool,
    pub confidence: Option<ConfidenceResult>,
    pub refusal_triggered: bool,
    pub refusal_reason: Option<String>,
    /// Errors of the last rejected attempt, if any.
    pub last_attempt_errors: Vec<String>,
}

/// Outcome of one query. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalAnswer {
    pub query_id: Uuid,
    pub query: String,
    /// `None` when refused.
    pub answer: Option<String>,
    pub sentences: Vec<SentenceDetail>,
    pub citations: Vec<Citation>,
    pub evidence: Vec<EvidenceChunk>,
    pub metrics: AnswerMetrics,
    pub refused: bool,
    pub refusal: Option<RefusalReason>,
    pub refusal_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FinalAnswer {
    /// Answer text, or the standard refusal message.
    pub fn display_text(&self) -> &str {
        self.answer.as_deref().unwrap_or(REFUSAL_MESSAGE)
    }
}

/// State of one generation attempt. Each transition produces a new value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AnswerAttempt {
    pub(crate) number: usize,
    pub(crate) prompt: String,
    pub(crate) response: String,
    pub(crate) errors: Vec<String>,
}

impl AnswerAttempt {
    pub(crate) fn new(number: usize, prompt: String) -> Self {
        Self {
            number,
            prompt,
            response: String::new(),
            errors: vec![],
        }
    }

    pub(crate) fn with_response(self, response: String) -> Self {
        Self { response, ..self }
    }

    pub(crate) fn with_errors(self, errors: Vec<String>) -> Self {
        Self { errors, ..self }
    }
}
