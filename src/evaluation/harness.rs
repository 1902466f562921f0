use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::cited_relevant;
use crate::answer::{AnswerError, FinalAnswer, Orchestrator};
use crate::refusal::RefusalReason;

/// One query of a labeled evaluation set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledQuery {
    pub id: String,
    pub query: String,
    #[serde(default)]
    pub relevant_papers: Vec<String>,
    /// True for questions the corpus cannot answer.
    #[serde(default)]
    pub should_refuse: bool,
}

/// Outcome of one `should_refuse` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefusalOutcome {
    pub refused: bool,
    pub correct: bool,
    pub confidence: f32,
    pub refusal_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RefusalReport {
    /// Share of `should_refuse` queries that were refused; 1.0 when there are none.
    pub refusal_accuracy: f64,
    /// Refusals caused by the confidence threshold.
    pub confidence_refusals: usize,
    pub per_query: BTreeMap<String, RefusalOutcome>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CitationReport {
    /// Share of cited answers that cite at least one relevant paper.
    pub citation_precision: f64,
    /// Answerable queries whose answer carried citations.
    pub total_evaluated: usize,
}

/// A query counts as refused when the pipeline refused or returned nothing to cite.
fn counts_as_refused(answer: &FinalAnswer) -> bool {
    answer.refused || answer.citations.is_empty()
}

/// Runs every `should_refuse` query and checks that the pipeline withholds an answer.
///
/// The relevant set, when given, is passed through so confidence is scored the same
/// way as in production evaluation runs.
pub async fn evaluate_refusals(
    orchestrator: &Orchestrator,
    queries: &[LabeledQuery],
) -> Result<RefusalReport, AnswerError> {
    let mut report = RefusalReport::default();
    let mut correct = 0usize;

    for labeled in queries.iter().filter(|q| q.should_refuse) {
        let answer = orchestrator
            .answer_with_relevant(&labeled.query, Some(labeled.relevant_papers.as_slice()))
            .await?;

        let refused = counts_as_refused(&answer);
        if refused && matches!(answer.refusal, Some(RefusalReason::LowConfidence { .. })) {
            report.confidence_refusals += 1;
        }
        correct += usize::from(refused);

        report.per_query.insert(
            labeled.id.clone(),
            RefusalOutcome {
                refused,
                correct: refused,
                confidence: answer
                    .metrics
                    .confidence
                    .map_or(0.0, |c| c.confidence_score),
                refusal_reason: answer.refusal_reason,
            },
        );
    }

    let total = report.per_query.len();
    report.refusal_accuracy = if total == 0 {
        1.0
    } else {
        correct as f64 / total as f64
    };

    info!(
        evaluated = total,
        accuracy = report.refusal_accuracy,
        confidence_refusals = report.confidence_refusals,
        "Refusal evaluation complete"
    );
    Ok(report)
}

/// Runs every answerable query and checks that cited answers cite a relevant paper.
///
/// Answers without citations are skipped, not counted as misses.
pub async fn evaluate_citations(
    orchestrator: &Orchestrator,
    queries: &[LabeledQuery],
) -> Result<CitationReport, AnswerError> {
    let mut correct = 0usize;
    let mut total = 0usize;

    for labeled in queries.iter().filter(|q| !q.should_refuse) {
        let answer = orchestrator.answer(&labeled.query).await?;
        if answer.citations.is_empty() {
            continue;
        }

        total += 1;
        if cited_relevant(&answer, &labeled.relevant_papers) {
            correct += 1;
        }
    }

    let citation_precision = if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    };

    info!(
        evaluated = total,
        precision = citation_precision,
        "Citation evaluation complete"
    );
    Ok(CitationReport {
        citation_precision,
        total_evaluated: total,
    })
}
