//! Offline retrieval and citation metrics, plus answer-level evaluation over a
//! labeled query set ([`evaluate_refusals`], [`evaluate_citations`]).
//!
//! Every comparison goes through [`normalize_paper_id`], so `arXiv:2401.01234v2` and
//! `2401.01234` count as the same paper.

mod harness;

#[cfg(test)]
mod tests;

pub use harness::{
    CitationReport, LabeledQuery, RefusalOutcome, RefusalReport, evaluate_citations,
    evaluate_refusals,
};

use crate::answer::FinalAnswer;
use crate::evidence::{normalize_paper_id, normalized_set};

/// Relevant hits among the first `k` retrieved ids, divided by `k`.
///
/// Duplicated retrieved ids each count. 0.0 when `relevant` is empty or `k == 0`.
pub fn precision_at_k<R, S>(retrieved_ids: &[R], relevant: &[S], k: usize) -> f64
where
    R: AsRef<str>,
    S: AsRef<str>,
{
    let relevant = normalized_set(relevant);
    if relevant.is_empty() || k == 0 {
        return 0.0;
    }

    let hits = retrieved_ids
        .iter()
        .take(k)
        .filter(|id| relevant.contains(&normalize_paper_id(id.as_ref())))
        .count();
    hits as f64 / k as f64
}

/// Fraction of distinct relevant papers found among the first `k` retrieved ids.
pub fn recall_at_k<R, S>(retrieved_ids: &[R], relevant: &[S], k: usize) -> f64
where
    R: AsRef<str>,
    S: AsRef<str>,
{
    let relevant = normalized_set(relevant);
    if relevant.is_empty() {
        return 0.0;
    }

    let found = normalized_set(retrieved_ids.iter().take(k));
    let hits = relevant.intersection(&found).count();
    hits as f64 / relevant.len() as f64
}

/// True when any citation of `answer` points at a relevant paper.
pub fn cited_relevant<S: AsRef<str>>(answer: &FinalAnswer, relevant: &[S]) -> bool {
    let relevant = normalized_set(relevant);
    answer
        .citations
        .iter()
        .any(|c| relevant.contains(&normalize_paper_id(&c.paper_id)))
}
